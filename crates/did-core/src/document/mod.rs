//! # DID Document
//!
//! A DID Document is a JSON-LD document that contains information related to a DID. Includes
//! utilities for looking up verification methods and services.

pub mod context;
pub mod service;
pub mod verification_method;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use self::context::DID_CONTEXT;
pub use self::service::{check_services, Endpoint, Service};
pub use self::verification_method::{KeyFormat, KeyPurpose, VerificationMethod};
use crate::core::{Kind, OneMany};
use crate::jwk::Jwk;

/// DID Document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// The context of the DID document.
    #[serde(rename = "@context", default, with = "context_serialization")]
    pub context: Vec<Kind<Value>>,

    /// The DID for a particular DID subject.
    pub id: String,

    /// A set of URIs that are other identifiers for the subject of the above DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,

    /// One or more DIDs authorized to make changes to the DID document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<OneMany<String>>,

    /// If set, MUST be a set of verification methods for the DID subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,

    /// How the DID subject is expected to be authenticated.
    ///
    /// <https://www.w3.org/TR/did-core/#authentication>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<Kind<VerificationMethod>>>,

    /// How the DID subject is expected to express claims, such as for the purposes of issuing a
    /// Verifiable Credential.
    ///
    /// <https://www.w3.org/TR/did-core/#assertion>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<Kind<VerificationMethod>>>,

    /// How an entity can generate encryption material in order to transmit confidential
    /// information intended for the DID subject.
    ///
    /// <https://www.w3.org/TR/did-core/#key-agreement>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<Kind<VerificationMethod>>>,

    /// A verification method that might be used by the DID subject to invoke a cryptographic
    /// capability, such as the authorization to update the DID Document.
    ///
    /// <https://www.w3.org/TR/did-core/#capability-invocation>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<Kind<VerificationMethod>>>,

    /// A mechanism that might be used by the DID subject to delegate a cryptographic capability
    /// to another party.
    ///
    /// <https://www.w3.org/TR/did-core/#capability-delegation>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<Kind<VerificationMethod>>>,

    /// A set of services, that express ways of communicating with the DID subject or related
    /// entities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,
}

impl DidDocument {
    /// An empty document for `did` with the default context.
    #[must_use]
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            context: vec![Kind::String(DID_CONTEXT.to_string())],
            id: did.into(),
            ..Self::default()
        }
    }

    /// Retrieve a service by its ID or ID fragment.
    #[must_use]
    pub fn service(&self, id: &str) -> Option<&Service> {
        let fragment = id.rsplit_once('#').map_or(id, |(_, f)| f);
        self.service.as_ref()?.iter().find(|s| s.id == id || s.local_id() == fragment)
    }

    /// Retrieve a verification method by its ID. A bare fragment (`#key-1` or `key-1`) is
    /// resolved against the document ID.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        let full = if id.starts_with("did:") {
            id.to_string()
        } else {
            format!("{}#{}", self.id, id.trim_start_matches('#'))
        };
        self.verification_method.as_ref()?.iter().find(|vm| vm.id == full)
    }

    /// The relationship entries for a purpose.
    #[must_use]
    pub fn relationship(&self, purpose: KeyPurpose) -> &[Kind<VerificationMethod>] {
        let rel = match purpose {
            KeyPurpose::Authentication => &self.authentication,
            KeyPurpose::AssertionMethod => &self.assertion_method,
            KeyPurpose::KeyAgreement => &self.key_agreement,
            KeyPurpose::CapabilityInvocation => &self.capability_invocation,
            KeyPurpose::CapabilityDelegation => &self.capability_delegation,
        };
        rel.as_deref().unwrap_or_default()
    }

    /// Mutable relationship entries for a purpose, created if absent.
    pub fn relationship_mut(&mut self, purpose: KeyPurpose) -> &mut Vec<Kind<VerificationMethod>> {
        let rel = match purpose {
            KeyPurpose::Authentication => &mut self.authentication,
            KeyPurpose::AssertionMethod => &mut self.assertion_method,
            KeyPurpose::KeyAgreement => &mut self.key_agreement,
            KeyPurpose::CapabilityInvocation => &mut self.capability_invocation,
            KeyPurpose::CapabilityDelegation => &mut self.capability_delegation,
        };
        rel.get_or_insert_with(Vec::new)
    }

    /// IDs of the verification methods usable for a purpose, whether referenced or embedded.
    #[must_use]
    pub fn verification_method_ids(&self, purpose: KeyPurpose) -> Vec<&str> {
        self.relationship(purpose)
            .iter()
            .map(|k| match k {
                Kind::String(id) => id.as_str(),
                Kind::Object(vm) => vm.id.as_str(),
            })
            .collect()
    }

    /// The first verification method usable for a purpose. References that do not resolve to a
    /// method in the document are skipped.
    #[must_use]
    pub fn select_verification_method(&self, purpose: KeyPurpose) -> Option<&VerificationMethod> {
        self.relationship(purpose).iter().find_map(|k| match k {
            Kind::String(id) => self.verification_method(id),
            Kind::Object(vm) => Some(vm),
        })
    }

    /// Purposes the verification method with `id` is listed under.
    #[must_use]
    pub fn purposes(&self, id: &str) -> Vec<KeyPurpose> {
        KeyPurpose::ALL
            .into_iter()
            .filter(|p| self.verification_method_ids(*p).contains(&id))
            .collect()
    }

    /// The ID of the verification method whose public key has the same JWK thumbprint as `jwk`.
    #[must_use]
    pub fn verification_method_id(&self, jwk: &Jwk) -> Option<String> {
        let thumbprint = jwk.thumbprint().ok()?;
        self.verification_method.as_ref()?.iter().find_map(|vm| {
            let key = vm.jwk().ok()?;
            (key.thumbprint().ok()? == thumbprint).then(|| vm.id.clone())
        })
    }
}

mod context_serialization {
    use serde::de::Deserializer;
    use serde::ser::Serializer;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    use crate::core::Kind;

    pub fn serialize<S>(value: &[Kind<Value>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            [Kind::String(single)] => serializer.serialize_str(single),
            _ => value.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Kind<Value>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // an untagged `Kind::Object(Value)` would also accept an array
        let to_kind = |value: Value| match value {
            Value::String(s) => Kind::String(s),
            other => Kind::Object(other),
        };
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().map(to_kind).collect(),
            single => vec![to_kind(single)],
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn alice() -> DidDocument {
        serde_json::from_value(json!({
            "@context": "https://www.w3.org/ns/did/v1",
            "id": "did:method:alice",
            "verificationMethod": [
                {
                    "id": "did:method:alice#key-1",
                    "type": "JsonWebKey2020",
                    "controller": "did:method:alice",
                    "publicKeyJwk": {
                        "crv": "Ed25519",
                        "kty": "OKP",
                        "x": "GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc"
                    }
                },
                {
                    "id": "did:method:alice#key-2",
                    "type": "Ed25519VerificationKey2020",
                    "controller": "did:method:alice",
                    "publicKeyMultibase": "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
                }
            ],
            "authentication": ["did:method:alice#key-1"],
            "assertionMethod": [
                "did:method:alice#missing",
                "#key-2"
            ],
            "keyAgreement": [{
                "id": "did:method:alice#key-3",
                "type": "JsonWebKey2020",
                "controller": "did:method:alice",
                "publicKeyJwk": {
                    "crv": "X25519",
                    "kty": "OKP",
                    "x": "bl_3kgKpz9jgsg350CNuHa_kQL3B60Gi-98WmdQW2h8"
                }
            }],
            "service": [{
                "id": "did:method:alice#dwn",
                "type": "DecentralizedWebNode",
                "serviceEndpoint": "https://dwn.example.com"
            }]
        }))
        .expect("should deserialize")
    }

    #[test]
    fn verification_method_id_by_thumbprint() {
        let doc = alice();

        let jwk: Jwk = serde_json::from_value(json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc",
            "kid": "ignored"
        }))
        .expect("should deserialize");
        assert_eq!(doc.verification_method_id(&jwk).as_deref(), Some("did:method:alice#key-1"));

        // multibase keys are compared by their JWK form
        let jwk = Jwk::okp("Ed25519", "Lm_M42cB3HkUiODQsXRcweM6TByfzEHGO9ND274JcOY");
        assert_eq!(doc.verification_method_id(&jwk).as_deref(), Some("did:method:alice#key-2"));

        let unknown = Jwk::okp("Ed25519", "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo");
        assert_eq!(doc.verification_method_id(&unknown), None);
    }

    #[test]
    fn select_by_purpose() {
        let doc = alice();

        let vm = doc.select_verification_method(KeyPurpose::Authentication).expect("auth key");
        assert_eq!(vm.id, "did:method:alice#key-1");

        // unresolvable references are skipped
        let vm = doc.select_verification_method(KeyPurpose::AssertionMethod).expect("assert key");
        assert_eq!(vm.id, "did:method:alice#key-2");

        // embedded methods are returned directly
        let vm = doc.select_verification_method(KeyPurpose::KeyAgreement).expect("agreement key");
        assert_eq!(vm.id, "did:method:alice#key-3");

        assert!(doc.select_verification_method(KeyPurpose::CapabilityDelegation).is_none());
        assert_eq!(doc.purposes("did:method:alice#key-1"), [KeyPurpose::Authentication]);
    }

    #[test]
    fn service_lookup() {
        let doc = alice();
        assert!(doc.service("did:method:alice#dwn").is_some());
        assert!(doc.service("#dwn").is_some());
        assert!(doc.service("other").is_none());
    }

    #[test]
    fn context_shapes() {
        let doc = alice();
        let json = serde_json::to_value(&doc).expect("should serialize");
        assert_eq!(json["@context"], json!("https://www.w3.org/ns/did/v1"));

        let mut doc = DidDocument::new("did:example:123");
        doc.context.push(Kind::Object(json!({"@base": "did:example:123"})));
        let json = serde_json::to_value(&doc).expect("should serialize");
        assert_eq!(
            json,
            json!({
                "@context": ["https://www.w3.org/ns/did/v1", {"@base": "did:example:123"}],
                "id": "did:example:123"
            })
        );
    }

    #[test]
    fn context_array_round_trip() {
        let input = json!({
            "@context": ["https://www.w3.org/ns/did/v1", {"@base": "did:ion:abc"}],
            "id": "did:ion:abc"
        });
        let doc: DidDocument = serde_json::from_value(input.clone()).expect("should deserialize");
        assert_eq!(
            doc.context,
            [
                Kind::String("https://www.w3.org/ns/did/v1".to_string()),
                Kind::Object(json!({"@base": "did:ion:abc"}))
            ]
        );
        assert_eq!(serde_json::to_value(&doc).expect("should serialize"), input);

        let doc: DidDocument = serde_json::from_value(json!({
            "@context": "https://www.w3.org/ns/did/v1",
            "id": "did:ion:abc"
        }))
        .expect("should deserialize");
        assert_eq!(doc.context, [Kind::String("https://www.w3.org/ns/did/v1".to_string())]);
    }
}
