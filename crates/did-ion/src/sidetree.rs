//! # Sidetree
//!
//! Wire types for Sidetree create operations and the document state they carry, along with the
//! derivation of short- and long-form DIDs from a create request.
//!
//! <https://identity.foundation/sidetree/spec/>

use std::collections::HashSet;

use base64ct::{Base64UrlUnpadded, Encoding};
use did_core::core::{Kind, OneMany};
use did_core::document::context::JSON_WEB_KEY_2020;
use did_core::document::service::MAX_SERVICE_TYPE_LEN;
use did_core::error::Err;
use did_core::hashing::{canonicalize, hash_commitment, hash_data};
use did_core::{
    tracerr, DidDocument, Endpoint, Jwk, KeyPurpose, Result, Service, VerificationMethod,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::METHOD;

/// Maximum size of the canonical JSON delta in a create operation.
pub const MAX_DELTA_SIZE: usize = 1000;

/// Maximum length of a public key or service ID.
pub const MAX_ID_LEN: usize = 50;

/// Sidetree operation types.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Create a new DID.
    #[default]
    Create,
}

/// A Sidetree create operation, as submitted to a gateway.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Operation type.
    #[serde(rename = "type")]
    pub type_: OperationType,

    /// Suffix data, the hash of which is the DID suffix.
    pub suffix_data: SuffixData,

    /// The initial document state and update commitment.
    pub delta: Delta,
}

/// Data hashed to form the DID suffix.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuffixData {
    /// Hash of the canonical delta.
    pub delta_hash: String,

    /// Commitment to the recovery key.
    pub recovery_commitment: String,
}

/// DID state changes.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    /// Patches to apply, in order.
    pub patches: Vec<Patch>,

    /// Commitment to the update key.
    pub update_commitment: String,
}

/// A change to the DID document state.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Patch {
    /// Replace the entire document state.
    Replace {
        /// The new state.
        document: DocumentState,
    },

    /// Add public keys, replacing any with the same ID.
    AddPublicKeys {
        /// Keys to add.
        public_keys: Vec<PublicKeyEntry>,
    },

    /// Remove public keys by ID.
    RemovePublicKeys {
        /// IDs of the keys to remove.
        ids: Vec<String>,
    },

    /// Add services, replacing any with the same ID.
    AddServices {
        /// Services to add.
        services: Vec<ServiceEntry>,
    },

    /// Remove services by ID.
    RemoveServices {
        /// IDs of the services to remove.
        ids: Vec<String>,
    },
}

/// The public keys and services of a DID document, as held by Sidetree. IDs are local to the
/// document: no DID and no `#`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentState {
    /// Public keys.
    pub public_keys: Vec<PublicKeyEntry>,

    /// Services.
    pub services: Vec<ServiceEntry>,
}

/// A public key in Sidetree document state.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyEntry {
    /// Local key ID.
    pub id: String,

    /// Verification method type.
    #[serde(rename = "type")]
    pub type_: String,

    /// The public key.
    pub public_key_jwk: Jwk,

    /// Verification relationships the key is used for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purposes: Vec<KeyPurpose>,
}

/// A service in Sidetree document state.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// Local service ID.
    pub id: String,

    /// Service type.
    #[serde(rename = "type")]
    pub type_: String,

    /// Service endpoint.
    pub service_endpoint: Endpoint,
}

/// A key to include in a new DID document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyInput {
    /// Key ID. Anything up to the last `#` is dropped. Defaults to the JWK thumbprint.
    pub id: Option<String>,

    /// Verification method type. Defaults to `JsonWebKey2020`.
    pub type_: Option<String>,

    /// The public key.
    pub public_key_jwk: Jwk,

    /// Verification relationships the key is used for.
    pub purposes: Vec<KeyPurpose>,
}

/// The long-form DID segment: the create operation without its type.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LongFormSegment {
    pub suffix_data: SuffixData,
    pub delta: Delta,
}

/// Reduce an ID to the text after its last `#`.
#[must_use]
pub fn local_id(id: &str) -> &str {
    id.rsplit_once('#').map_or(id, |(_, f)| f)
}

impl CreateRequest {
    /// Build a create request, committing to the recovery and update keys.
    ///
    /// # Errors
    ///
    /// Returns an error if a key cannot be hashed or the delta exceeds [`MAX_DELTA_SIZE`].
    pub fn new(recovery_key: &Jwk, update_key: &Jwk, document: DocumentState) -> Result<Self> {
        let recovery_commitment = hash_commitment(&recovery_key.canonical())?;
        let update_commitment = hash_commitment(&update_key.canonical())?;
        Self::from_commitments(recovery_commitment, update_commitment, document)
    }

    /// Build a create request from precomputed key commitments.
    ///
    /// # Errors
    ///
    /// Returns [`Err::InvalidFormat`] if the delta exceeds [`MAX_DELTA_SIZE`].
    pub fn from_commitments(
        recovery_commitment: impl Into<String>,
        update_commitment: impl Into<String>,
        document: DocumentState,
    ) -> Result<Self> {
        let delta = Delta {
            patches: vec![Patch::Replace { document }],
            update_commitment: update_commitment.into(),
        };
        check_delta(&delta)?;

        Ok(Self {
            type_: OperationType::Create,
            suffix_data: SuffixData {
                delta_hash: hash_data(&delta)?,
                recovery_commitment: recovery_commitment.into(),
            },
            delta,
        })
    }

    /// The DID suffix: the hash of the suffix data.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix data cannot be hashed.
    pub fn suffix(&self) -> Result<String> {
        hash_data(&self.suffix_data)
    }

    /// The short-form DID. A network of `mainnet` (or none) adds no network segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix data cannot be hashed.
    pub fn short_form_did(&self, network: Option<&str>) -> Result<String> {
        let suffix = self.suffix()?;
        match network {
            Some(network) if !network.is_empty() && network != "mainnet" => {
                Ok(format!("did:{METHOD}:{network}:{suffix}"))
            }
            _ => Ok(format!("did:{METHOD}:{suffix}")),
        }
    }

    /// The long-form DID: the short-form DID followed by the base64url encoded canonical JSON of
    /// the suffix data and delta.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be serialized.
    pub fn long_form_did(&self, network: Option<&str>) -> Result<String> {
        let segment = LongFormSegment {
            suffix_data: self.suffix_data.clone(),
            delta: self.delta.clone(),
        };
        let encoded = Base64UrlUnpadded::encode_string(&canonicalize(&segment)?);
        Ok(format!("{}:{encoded}", self.short_form_did(network)?))
    }
}

/// Check the delta can be marshalled to canonical JSON that is no more than 1000 bytes long.
///
/// # Errors
///
/// Returns [`Err::InvalidFormat`] if the delta is too long.
pub fn check_delta(delta: &Delta) -> Result<()> {
    let len = canonicalize(delta)?.len();
    if len > MAX_DELTA_SIZE {
        tracerr!(Err::InvalidFormat, "delta longer than {MAX_DELTA_SIZE} bytes: {len}");
    }
    Ok(())
}

impl DocumentState {
    /// Build document state from keys and services. IDs are reduced to their fragment and
    /// purposes put in canonical order.
    ///
    /// # Errors
    ///
    /// Returns an error if the state fails [`DocumentState::validate`] or a key has no
    /// thumbprint.
    pub fn new(public_keys: &[PublicKeyInput], services: &[Service]) -> Result<Self> {
        let mut state = Self::default();

        for input in public_keys {
            let public_key_jwk = input.public_key_jwk.to_public();
            let id = match &input.id {
                Some(id) => local_id(id).to_string(),
                None => public_key_jwk.thumbprint()?,
            };
            let mut purposes = input.purposes.clone();
            purposes.sort_unstable();
            purposes.dedup();

            state.public_keys.push(PublicKeyEntry {
                id,
                type_: input.type_.clone().unwrap_or_else(|| JSON_WEB_KEY_2020.to_string()),
                public_key_jwk,
                purposes,
            });
        }

        for service in services {
            state.services.push(ServiceEntry {
                id: local_id(&service.id).to_string(),
                type_: service.type_.clone(),
                service_endpoint: single_endpoint(service)?,
            });
        }

        state.validate()?;
        Ok(state)
    }

    /// Recover document state from a DID document.
    ///
    /// # Errors
    ///
    /// Returns an error if a verification method key cannot be expressed as a JWK or a service has
    /// more than one endpoint.
    pub fn from_document(document: &DidDocument) -> Result<Self> {
        let mut state = Self::default();

        for vm in document.verification_method.as_deref().unwrap_or_default() {
            let mut purposes = document.purposes(&vm.id);
            purposes.sort_unstable();
            state.public_keys.push(PublicKeyEntry {
                id: local_id(&vm.id).to_string(),
                type_: vm.type_.clone(),
                public_key_jwk: vm.jwk()?,
                purposes,
            });
        }
        for service in document.service.as_deref().unwrap_or_default() {
            state.services.push(ServiceEntry {
                id: service.local_id().to_string(),
                type_: service.type_.clone(),
                service_endpoint: single_endpoint(service)?,
            });
        }

        Ok(state)
    }

    /// Check IDs are unique base64url strings of at most [`MAX_ID_LEN`] characters, service
    /// types are at most 30 characters and service endpoints are URLs.
    ///
    /// # Errors
    ///
    /// * [`Err::InvalidFormat`] if an ID, type or endpoint is malformed.
    /// * [`Err::InvalidInput`] if an ID is duplicated.
    pub fn validate(&self) -> Result<()> {
        let mut key_ids = HashSet::new();
        for key in &self.public_keys {
            check_id(&key.id)?;
            if !key_ids.insert(key.id.as_str()) {
                tracerr!(Err::InvalidInput, "duplicate public key ID: {}", key.id);
            }
            if key.public_key_jwk.is_private() {
                tracerr!(Err::InvalidInput, "public key {} has private key material", key.id);
            }
        }

        let mut service_ids = HashSet::new();
        for service in &self.services {
            check_id(&service.id)?;
            if !service_ids.insert(service.id.as_str()) {
                tracerr!(Err::InvalidInput, "duplicate service ID: {}", service.id);
            }
            if service.type_.len() > MAX_SERVICE_TYPE_LEN {
                tracerr!(
                    Err::InvalidFormat,
                    "service type exceeds limit of {MAX_SERVICE_TYPE_LEN}: {}",
                    service.type_
                );
            }
            match &service.service_endpoint {
                Kind::String(endpoint) => {
                    url::Url::parse(endpoint)?;
                }
                Kind::Object(map) => {
                    if map.is_empty() {
                        tracerr!(Err::InvalidFormat, "service {} has no endpoint", service.id);
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply a patch.
    pub fn apply(&mut self, patch: &Patch) {
        match patch {
            Patch::Replace { document } => *self = document.clone(),
            Patch::AddPublicKeys { public_keys } => {
                for key in public_keys {
                    self.public_keys.retain(|k| k.id != key.id);
                    self.public_keys.push(key.clone());
                }
            }
            Patch::RemovePublicKeys { ids } => {
                self.public_keys.retain(|k| !ids.contains(&k.id));
            }
            Patch::AddServices { services } => {
                for service in services {
                    self.services.retain(|s| s.id != service.id);
                    self.services.push(service.clone());
                }
            }
            Patch::RemoveServices { ids } => {
                self.services.retain(|s| !ids.contains(&s.id));
            }
        }
    }

    /// Apply patches in order.
    pub fn apply_patches(&mut self, patches: &[Patch]) {
        for patch in patches {
            self.apply(patch);
        }
    }

    /// Express the state as a DID document for `did`.
    #[must_use]
    pub fn to_document(&self, did: &str) -> DidDocument {
        let mut document = DidDocument::new(did);
        document.context.push(Kind::Object(json!({ "@base": did })));

        let mut methods = Vec::new();
        for key in &self.public_keys {
            let id = format!("{did}#{}", key.id);
            for purpose in &key.purposes {
                document.relationship_mut(*purpose).push(Kind::String(id.clone()));
            }
            methods.push(VerificationMethod {
                context: None,
                id,
                type_: key.type_.clone(),
                controller: did.to_string(),
                key: key.public_key_jwk.clone().into(),
            });
        }
        if !methods.is_empty() {
            document.verification_method = Some(methods);
        }

        let services = self
            .services
            .iter()
            .map(|s| Service {
                id: format!("{did}#{}", s.id),
                type_: s.type_.clone(),
                service_endpoint: OneMany::One(s.service_endpoint.clone()),
            })
            .collect::<Vec<_>>();
        if !services.is_empty() {
            document.service = Some(services);
        }

        document
    }
}

// Sidetree services carry exactly one endpoint.
fn single_endpoint(service: &Service) -> Result<Endpoint> {
    match &service.service_endpoint {
        OneMany::One(endpoint) => Ok(endpoint.clone()),
        OneMany::Many(endpoints) if endpoints.len() == 1 => Ok(endpoints[0].clone()),
        OneMany::Many(_) => {
            tracerr!(Err::InvalidInput, "service {} must have a single endpoint", service.id)
        }
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        tracerr!(Err::InvalidFormat, "ID must be 1 to {MAX_ID_LEN} characters: {id}");
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        tracerr!(Err::InvalidFormat, "ID is not base64url: {id}");
    }
    Ok(())
}

// The recovery and update commitments of a long-form segment, exposed in document metadata the
// way gateways report them.
pub(crate) fn method_metadata(segment: &LongFormSegment, published: bool) -> Value {
    json!({
        "published": published,
        "recoveryCommitment": segment.suffix_data.recovery_commitment,
        "updateCommitment": segment.delta.update_commitment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ION SDK test vector
    const SDK_LONG_FORM: &str = "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg:eyJkZWx0YSI6eyJwYXRjaGVzIjpbeyJhY3Rpb24iOiJyZXBsYWNlIiwiZG9jdW1lbnQiOnsicHVibGljS2V5cyI6W3siaWQiOiJwdWJsaWNLZXlNb2RlbDFJZCIsInB1YmxpY0tleUp3ayI6eyJjcnYiOiJzZWNwMjU2azEiLCJrdHkiOiJFQyIsIngiOiJ0WFNLQl9ydWJYUzdzQ2pYcXVwVkpFelRjVzNNc2ptRXZxMVlwWG45NlpnIiwieSI6ImRPaWNYcWJqRnhvR0otSzAtR0oxa0hZSnFpY19EX09NdVV3a1E3T2w2bmsifSwicHVycG9zZXMiOlsiYXV0aGVudGljYXRpb24iLCJrZXlBZ3JlZW1lbnQiXSwidHlwZSI6IkVjZHNhU2VjcDI1NmsxVmVyaWZpY2F0aW9uS2V5MjAxOSJ9XSwic2VydmljZXMiOlt7ImlkIjoic2VydmljZTFJZCIsInNlcnZpY2VFbmRwb2ludCI6Imh0dHA6Ly93d3cuc2VydmljZTEuY29tIiwidHlwZSI6InNlcnZpY2UxVHlwZSJ9XX19XSwidXBkYXRlQ29tbWl0bWVudCI6IkVpREtJa3dxTzY5SVBHM3BPbEhrZGI4Nm5ZdDBhTnhTSFp1MnItYmhFem5qZEEifSwic3VmZml4RGF0YSI6eyJkZWx0YUhhc2giOiJFaUNmRFdSbllsY0Q5RUdBM2RfNVoxQUh1LWlZcU1iSjluZmlxZHo1UzhWRGJnIiwicmVjb3ZlcnlDb21taXRtZW50IjoiRWlCZk9aZE10VTZPQnc4UGs4NzlRdFotMkotOUZiYmpTWnlvYUFfYnFENHpoQSJ9fQ";

    pub(crate) fn sdk_state() -> DocumentState {
        let key = PublicKeyInput {
            id: Some("publicKeyModel1Id".to_string()),
            type_: Some("EcdsaSecp256k1VerificationKey2019".to_string()),
            public_key_jwk: Jwk::ec(
                "secp256k1",
                "tXSKB_rubXS7sCjXqupVJEzTcW3MsjmEvq1YpXn96Zg",
                "dOicXqbjFxoGJ-K0-GJ1kHYJqic_D_OMuUwkQ7Ol6nk",
            ),
            purposes: vec![KeyPurpose::KeyAgreement, KeyPurpose::Authentication],
        };
        let service = Service::new("service1Id", "service1Type", "http://www.service1.com");
        DocumentState::new(&[key], &[service]).expect("valid state")
    }

    fn sdk_request() -> CreateRequest {
        CreateRequest::from_commitments(
            "EiBfOZdMtU6OBw8Pk879QtZ-2J-9FbbjSZyoaA_bqD4zhA",
            "EiDKIkwqO69IPG3pOlHkdb86nYt0aNxSHZu2r-bhEznjdA",
            sdk_state(),
        )
        .expect("should build request")
    }

    #[test]
    fn sdk_vector() {
        let request = sdk_request();

        assert_eq!(request.long_form_did(None).expect("long form"), SDK_LONG_FORM);
        insta::assert_snapshot!(request.short_form_did(None).expect("short form"), @"did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg");
        insta::assert_snapshot!(request.suffix_data.delta_hash, @"EiCfDWRnYlcD9EGA3d_5Z1AHu-iYqMbJ9nfiqdz5S8VDbg");
    }

    #[test]
    fn network_segment() {
        let request = sdk_request();

        let did = request.short_form_did(Some("test")).expect("short form");
        assert_eq!(did, "did:ion:test:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg");
        let did = request.short_form_did(Some("mainnet")).expect("short form");
        assert_eq!(did, "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg");
    }

    #[test]
    fn request_json() {
        let value = serde_json::to_value(sdk_request()).expect("should serialize");

        assert_eq!(value["type"], "create");
        assert_eq!(value["delta"]["patches"][0]["action"], "replace");
        assert_eq!(
            value["delta"]["patches"][0]["document"]["publicKeys"][0]["purposes"],
            json!(["authentication", "keyAgreement"])
        );
        assert_eq!(
            value["suffixData"]["recoveryCommitment"],
            "EiBfOZdMtU6OBw8Pk879QtZ-2J-9FbbjSZyoaA_bqD4zhA"
        );
    }

    #[test]
    fn delta_too_large() {
        let services = (0..20)
            .map(|i| Service::new(format!("service{i}"), "LinkedDomains", "https://example.com"))
            .collect::<Vec<_>>();
        let state = DocumentState::new(&[], &services).expect("valid state");

        let err = CreateRequest::from_commitments("a", "b", state).expect_err("too large");
        assert!(err.is(Err::InvalidFormat));
    }

    #[test]
    fn id_validation() {
        let jwk = Jwk::okp("Ed25519", "Lm_M42cB3HkUiODQsXRcweM6TByfzEHGO9ND274JcOY");
        let input = |id: &str| PublicKeyInput {
            id: Some(id.to_string()),
            type_: None,
            public_key_jwk: jwk.clone(),
            purposes: vec![KeyPurpose::Authentication],
        };

        let state = DocumentState::new(&[input("did:ion:abc#key-1")], &[]).expect("valid");
        assert_eq!(state.public_keys[0].id, "key-1");
        assert_eq!(state.public_keys[0].type_, "JsonWebKey2020");

        let err = DocumentState::new(&[input(&"k".repeat(51))], &[]).expect_err("too long");
        assert!(err.is(Err::InvalidFormat));
        let err = DocumentState::new(&[input("key 1")], &[]).expect_err("not base64url");
        assert!(err.is(Err::InvalidFormat));
        let err =
            DocumentState::new(&[input("key-1"), input("#key-1")], &[]).expect_err("duplicate");
        assert!(err.is(Err::InvalidInput));
    }

    #[test]
    fn default_key_id() {
        let input = PublicKeyInput {
            id: None,
            type_: None,
            public_key_jwk: Jwk::okp("Ed25519", "GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc"),
            purposes: vec![],
        };
        let state = DocumentState::new(&[input], &[]).expect("valid");
        insta::assert_snapshot!(state.public_keys[0].id, @"5pEn2Nf9ZormlGeOxvSznvLdroaIEJczDzHEUgYWG3w");
    }

    #[test]
    fn service_validation() {
        let err = DocumentState::new(&[], &[Service::new("dwn", "T".repeat(31), "https://a.b")])
            .expect_err("type too long");
        assert!(err.is(Err::InvalidFormat));

        let err = DocumentState::new(&[], &[Service::new("dwn", "DWN", "not a url")])
            .expect_err("bad endpoint");
        assert!(err.is(Err::InvalidFormat));
    }

    #[test]
    fn patches() {
        let mut state = DocumentState::default();
        state.apply_patches(&sdk_request().delta.patches);
        assert_eq!(state, sdk_state());

        let key = PublicKeyEntry {
            id: "key-2".to_string(),
            type_: "JsonWebKey2020".to_string(),
            public_key_jwk: Jwk::okp("Ed25519", "GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc"),
            purposes: vec![KeyPurpose::AssertionMethod],
        };
        state.apply_patches(&[
            Patch::AddPublicKeys {
                public_keys: vec![key],
            },
            Patch::RemovePublicKeys {
                ids: vec!["publicKeyModel1Id".to_string()],
            },
            Patch::RemoveServices {
                ids: vec!["service1Id".to_string()],
            },
        ]);
        assert_eq!(state.public_keys.len(), 1);
        assert_eq!(state.public_keys[0].id, "key-2");
        assert!(state.services.is_empty());

        let patch: Patch = serde_json::from_value(json!({
            "action": "add-services",
            "services": [{"id": "dwn", "type": "DWN", "serviceEndpoint": "https://dwn.example.com"}]
        }))
        .expect("should deserialize");
        state.apply(&patch);
        assert_eq!(state.services[0].id, "dwn");
    }

    #[test]
    fn document_from_state() {
        let did = "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg";
        let state = sdk_state();
        let doc = state.to_document(did);

        let vm_id = format!("{did}#publicKeyModel1Id");
        assert_eq!(doc.verification_method_ids(KeyPurpose::Authentication), [vm_id.as_str()]);
        assert_eq!(doc.verification_method_ids(KeyPurpose::KeyAgreement), [vm_id.as_str()]);
        assert!(doc.assertion_method.is_none());
        let service = doc.service(&format!("{did}#service1Id")).expect("has service");
        assert_eq!(service.type_, "service1Type");
        assert_eq!(
            serde_json::to_value(&doc.context).expect("context"),
            json!(["https://www.w3.org/ns/did/v1", {"@base": did}])
        );

        assert_eq!(DocumentState::from_document(&doc).expect("recoverable"), state);
    }
}
