//! # Bearer DID
//!
//! A [`BearerDid`] is a DID together with the key manager holding its private keys, so it can
//! sign on behalf of the DID subject. A [`PortableDid`] is its exportable serialization.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::{DidDocument, KeyPurpose, VerificationMethod};
use crate::error::Err;
use crate::jwk::Jwk;
use crate::keys::{Algorithm, KeyManager};
use crate::{tracerr, Result};

/// Creation and resolution metadata kept with a DID.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidMetadata {
    /// Whether the DID has been anchored to its network. Only set for anchored methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,

    /// The canonical (short) form of the DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,

    /// Public recovery key, for anchored methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_key: Option<Jwk>,

    /// Public update key, for anchored methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_key: Option<Jwk>,
}

/// The exportable form of a DID, optionally with its private keys.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortableDid {
    /// The DID URI.
    pub uri: String,

    /// The DID document.
    pub document: DidDocument,

    /// DID metadata.
    pub metadata: DidMetadata,

    /// Private keys for the DID's verification methods and control keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_keys: Option<Vec<Jwk>>,
}

/// Selects the key used by [`BearerDid::signer`].
#[derive(Clone, Debug, Default)]
pub struct SignerOptions {
    /// Sign with the key with this key URI.
    pub key_uri: Option<String>,

    /// Sign with the key of the verification method with this ID.
    pub method_id: Option<String>,
}

/// A DID with the key manager holding its private keys.
#[derive(Clone)]
pub struct BearerDid {
    /// The DID URI.
    pub uri: String,

    /// The DID document.
    pub document: DidDocument,

    /// DID metadata.
    pub metadata: DidMetadata,

    /// The key manager holding the DID's private keys.
    pub key_manager: Arc<dyn KeyManager>,
}

impl fmt::Debug for BearerDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerDid")
            .field("uri", &self.uri)
            .field("document", &self.document)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Signs with one key of a [`BearerDid`].
#[derive(Clone)]
pub struct DidSigner {
    key_manager: Arc<dyn KeyManager>,

    /// Key URI of the signing key.
    pub key_uri: String,

    /// ID of the verification method the key belongs to.
    pub method_id: String,

    /// Signing algorithm.
    pub algorithm: Algorithm,

    /// Public key.
    pub public_key: Jwk,
}

impl DidSigner {
    /// Sign `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key manager cannot sign with the key.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.key_manager.sign(&self.key_uri, data)
    }
}

impl fmt::Debug for DidSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DidSigner")
            .field("key_uri", &self.key_uri)
            .field("method_id", &self.method_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl BearerDid {
    /// Create a signer. Without options the first `assertionMethod` key is used, falling back to
    /// the first verification method.
    ///
    /// # Errors
    ///
    /// Returns [`Err::KeyNotFound`] if no matching verification method exists or the key manager
    /// does not hold its private key.
    pub fn signer(&self, options: &SignerOptions) -> Result<DidSigner> {
        let vm = self.select_method(options)?;
        let public_key = vm.jwk()?;
        let key_uri = self.key_manager.key_uri(&public_key)?;

        // fails with KeyNotFound when the key is not held
        self.key_manager.public_key(&key_uri)?;

        Ok(DidSigner {
            key_manager: self.key_manager.clone(),
            key_uri,
            method_id: vm.id.clone(),
            algorithm: Algorithm::from_jwk(&public_key)?,
            public_key,
        })
    }

    fn select_method(&self, options: &SignerOptions) -> Result<&VerificationMethod> {
        let methods = self.document.verification_method.as_deref().unwrap_or_default();

        if let Some(id) = &options.method_id {
            let Some(vm) = self.document.verification_method(id) else {
                tracerr!(Err::KeyNotFound, "no verification method {id}");
            };
            return Ok(vm);
        }
        if let Some(key_uri) = &options.key_uri {
            for vm in methods {
                let jwk = vm.jwk()?;
                if &self.key_manager.key_uri(&jwk)? == key_uri {
                    return Ok(vm);
                }
            }
            tracerr!(Err::KeyNotFound, "no verification method for key {key_uri}");
        }

        let selected = self
            .document
            .select_verification_method(KeyPurpose::AssertionMethod)
            .or_else(|| methods.first());
        let Some(vm) = selected else {
            tracerr!(Err::KeyNotFound, "{} has no verification methods", self.uri);
        };
        Ok(vm)
    }

    /// Export the DID with the private keys held by the key manager. Verification methods whose
    /// private key is not held, such as derived key agreement keys, are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the key manager fails for a reason other than a missing key.
    pub fn export(&self) -> Result<PortableDid> {
        let mut public_keys = Vec::new();
        for vm in self.document.verification_method.as_deref().unwrap_or_default() {
            public_keys.push(vm.jwk()?);
        }
        public_keys.extend(self.metadata.recovery_key.clone());
        public_keys.extend(self.metadata.update_key.clone());

        let mut private_keys = Vec::new();
        for jwk in &public_keys {
            let key_uri = self.key_manager.key_uri(jwk)?;
            match self.key_manager.export_key(&key_uri) {
                Ok(private) => private_keys.push(private),
                Err(e) if e.is(Err::KeyNotFound) => {
                    tracing::debug!("no private key for {key_uri}, not exported");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(PortableDid {
            uri: self.uri.clone(),
            document: self.document.clone(),
            metadata: self.metadata.clone(),
            private_keys: Some(private_keys),
        })
    }

    /// Reconstruct a bearer DID from its portable form, importing any private keys into
    /// `key_manager`.
    ///
    /// # Errors
    ///
    /// * Any error importing the private keys.
    /// * [`Err::KeyNotFound`] if the key manager holds no verification method key afterwards.
    pub fn import(portable: PortableDid, key_manager: Arc<dyn KeyManager>) -> Result<Self> {
        for key in portable.private_keys.as_deref().unwrap_or_default() {
            key_manager.import_key(key)?;
        }

        let mut held = false;
        for vm in portable.document.verification_method.as_deref().unwrap_or_default() {
            let key_uri = key_manager.key_uri(&vm.jwk()?)?;
            if key_manager.public_key(&key_uri).is_ok() {
                held = true;
                break;
            }
        }
        if !held {
            tracerr!(Err::KeyNotFound, "key manager holds no key for {}", portable.uri);
        }

        Ok(Self {
            uri: portable.uri,
            document: portable.document,
            metadata: portable.metadata,
            key_manager,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::keys::key_uri;

    // Holds fixed key pairs; signing returns the key URI bytes.
    #[derive(Default)]
    struct FixedKeys {
        keys: Mutex<HashMap<String, Jwk>>,
    }

    impl KeyManager for FixedKeys {
        fn generate_key(&self, _: Algorithm) -> Result<String> {
            tracerr!(Err::UnsupportedAlgorithm)
        }

        fn public_key(&self, key_uri: &str) -> Result<Jwk> {
            let keys = self.keys.lock().expect("lock");
            let Some(jwk) = keys.get(key_uri) else {
                tracerr!(Err::KeyNotFound)
            };
            Ok(jwk.to_public())
        }

        fn sign(&self, key_uri: &str, _: &[u8]) -> Result<Vec<u8>> {
            self.public_key(key_uri)?;
            Ok(key_uri.as_bytes().to_vec())
        }

        fn export_key(&self, key_uri: &str) -> Result<Jwk> {
            let keys = self.keys.lock().expect("lock");
            keys.get(key_uri).cloned().ok_or_else(|| Err::KeyNotFound.into())
        }

        fn import_key(&self, private_key: &Jwk) -> Result<String> {
            let uri = key_uri(&private_key.to_public())?;
            self.keys.lock().expect("lock").insert(uri.clone(), private_key.clone());
            Ok(uri)
        }
    }

    fn private_key(x: &str) -> Jwk {
        let Jwk::Okp(mut okp) = Jwk::okp("Ed25519", x) else {
            unreachable!()
        };
        okp.d = Some("c2VjcmV0".to_string());
        Jwk::Okp(okp)
    }

    fn document() -> DidDocument {
        serde_json::from_value(serde_json::json!({
            "id": "did:example:123",
            "verificationMethod": [
                {
                    "id": "did:example:123#key-1",
                    "type": "JsonWebKey2020",
                    "controller": "did:example:123",
                    "publicKeyJwk": {"kty": "OKP", "crv": "Ed25519", "x": "GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc"}
                },
                {
                    "id": "did:example:123#key-2",
                    "type": "JsonWebKey2020",
                    "controller": "did:example:123",
                    "publicKeyJwk": {"kty": "OKP", "crv": "X25519", "x": "bl_3kgKpz9jgsg350CNuHa_kQL3B60Gi-98WmdQW2h8"}
                }
            ],
            "assertionMethod": ["did:example:123#key-1"]
        }))
        .expect("should deserialize")
    }

    fn bearer() -> BearerDid {
        let keys = FixedKeys::default();
        keys.import_key(&private_key("GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc"))
            .expect("should import");
        BearerDid {
            uri: "did:example:123".to_string(),
            document: document(),
            metadata: DidMetadata::default(),
            key_manager: Arc::new(keys),
        }
    }

    #[test]
    fn default_signer() {
        let did = bearer();
        let signer = did.signer(&SignerOptions::default()).expect("should create signer");
        assert_eq!(signer.method_id, "did:example:123#key-1");
        assert_eq!(signer.algorithm, Algorithm::Ed25519);
        assert_eq!(signer.key_uri, "urn:jwk:5pEn2Nf9ZormlGeOxvSznvLdroaIEJczDzHEUgYWG3w");
        assert_eq!(signer.sign(b"data").expect("should sign"), signer.key_uri.as_bytes());
    }

    #[test]
    fn signer_for_missing_key() {
        let did = bearer();
        let options = SignerOptions {
            method_id: Some("#key-2".to_string()),
            ..SignerOptions::default()
        };
        assert!(did.signer(&options).expect_err("should fail").is(Err::KeyNotFound));
    }

    #[test]
    fn export_import() {
        let did = bearer();
        let portable = did.export().expect("should export");
        assert_eq!(portable.private_keys.as_ref().map(Vec::len), Some(1));

        let json = serde_json::to_value(&portable).expect("should serialize");
        assert!(json.get("privateKeys").is_some());

        let imported = BearerDid::import(portable, Arc::new(FixedKeys::default()))
            .expect("should import");
        assert_eq!(imported.uri, did.uri);
        imported.signer(&SignerOptions::default()).expect("should sign after import");
    }

    #[test]
    fn import_without_keys() {
        let mut portable = bearer().export().expect("should export");
        portable.private_keys = None;
        let err = BearerDid::import(portable, Arc::new(FixedKeys::default()))
            .expect_err("should fail");
        assert!(err.is(Err::KeyNotFound));
    }
}
