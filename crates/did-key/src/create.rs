//! # DID Key Registrar
//!
//! Creates `did:key` identifiers from a key held by a key manager.

use std::sync::Arc;

use did_core::error::Err;
use did_core::{
    multikey, tracerr, Algorithm, BearerDid, DidMetadata, Jwk, KeyManager, PortableDid, Result,
};

use crate::{DidKey, METHOD};

/// Options for [`DidKey::create`].
#[derive(Clone, Debug, Default)]
pub struct CreateOptions {
    /// Algorithm of the generated key. Ignored when `key_uri` is set.
    pub algorithm: Algorithm,

    /// Use this key, already held by the key manager, instead of generating one.
    pub key_uri: Option<String>,
}

impl DidKey {
    /// Create a `did:key` DID. A key is generated unless [`CreateOptions::key_uri`] names one the
    /// key manager already holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the key manager cannot generate or find the key, or the key has no
    /// `did:key` encoding.
    pub fn create(
        &self,
        key_manager: Arc<dyn KeyManager>,
        options: &CreateOptions,
    ) -> Result<BearerDid> {
        let key_uri = match &options.key_uri {
            Some(key_uri) => key_uri.clone(),
            None => key_manager.generate_key(options.algorithm)?,
        };
        let public_key = key_manager.public_key(&key_uri)?;

        let uri = Self::did_from_public_key(&public_key)?;
        let document = self.document(&uri)?;
        tracing::debug!("created {uri}");

        Ok(BearerDid {
            uri,
            document,
            metadata: DidMetadata::default(),
            key_manager,
        })
    }

    /// The `did:key` DID for a public key.
    ///
    /// # Errors
    ///
    /// Returns [`Err::UnsupportedPublicKeyType`] if the key type has no multicodec.
    pub fn did_from_public_key(public_key: &Jwk) -> Result<String> {
        let (codec, key) = multikey::from_jwk(public_key)?;
        multikey::validate(codec, &key)?;
        Ok(format!("did:{METHOD}:{}", multikey::encode(codec, &key)?))
    }

    /// Reconstruct a `did:key` bearer DID from its portable form.
    ///
    /// # Errors
    ///
    /// Returns [`Err::MethodNotSupported`] if the portable DID is not a `did:key`, otherwise any
    /// error from [`BearerDid::import`].
    pub fn import(portable: PortableDid, key_manager: Arc<dyn KeyManager>) -> Result<BearerDid> {
        if !portable.uri.starts_with("did:key:") {
            tracerr!(Err::MethodNotSupported, "not a did:key: {}", portable.uri);
        }
        BearerDid::import(portable, key_manager)
    }
}

#[cfg(test)]
mod tests {
    use did_core::KeyPurpose;
    use keyring::EphemeralKeyManager;

    use super::*;

    #[test]
    fn create_ed25519() {
        let key_manager = Arc::new(EphemeralKeyManager::new());
        let bearer = DidKey::default()
            .create(key_manager, &CreateOptions::default())
            .expect("should create");

        assert!(bearer.uri.starts_with("did:key:z6Mk"));

        let doc = &bearer.document;
        let vms = doc.verification_method.as_deref().expect("has methods");
        assert_eq!(vms[0].type_, "JsonWebKey2020");
        assert_eq!(doc.verification_method_ids(KeyPurpose::Authentication)[0], vms[0].id);
    }

    #[test]
    fn create_secp256k1() {
        let key_manager = Arc::new(EphemeralKeyManager::new());
        let options = CreateOptions {
            algorithm: Algorithm::Secp256k1,
            ..CreateOptions::default()
        };
        let bearer = DidKey::default().create(key_manager, &options).expect("should create");

        assert!(bearer.uri.starts_with("did:key:zQ3s"));
    }

    #[test]
    fn deterministic() {
        let key_manager = Arc::new(EphemeralKeyManager::new());
        let key_uri = key_manager.generate_key(Algorithm::Ed25519).expect("should generate");
        let options = CreateOptions {
            key_uri: Some(key_uri),
            ..CreateOptions::default()
        };

        let did_key = DidKey::default();
        let first = did_key.create(key_manager.clone(), &options).expect("should create");
        let second = did_key.create(key_manager, &options).expect("should create");

        assert_eq!(first.uri, second.uri);
        assert_eq!(first.document, second.document);
    }

    #[test]
    fn did_from_key() {
        let jwk = Jwk::okp("Ed25519", "GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc");
        let did = DidKey::did_from_public_key(&jwk).expect("should encode");
        insta::assert_snapshot!(did, @"did:key:z6Mkg87cSQcXPkZsxN3PVaAWWxEYBkavMdtpC3gfUKNZNxkN");

        let jwk = Jwk::ec("P-256", "x", "y");
        let err = DidKey::did_from_public_key(&jwk).expect_err("should fail");
        assert!(err.is(Err::UnsupportedPublicKeyType));
    }

    #[test]
    fn sign_with_bearer() {
        let key_manager = Arc::new(EphemeralKeyManager::new());
        let bearer = DidKey::default()
            .create(key_manager, &CreateOptions::default())
            .expect("should create");

        let signer = bearer.signer(&did_core::SignerOptions::default()).expect("should select");
        let vm_id = bearer.document.verification_method_ids(KeyPurpose::AssertionMethod)[0];
        assert_eq!(signer.method_id, vm_id);

        let sig = signer.sign(b"hello").expect("should sign");
        keyring::verify(&signer.public_key, b"hello", &sig).expect("should verify");
    }

    #[test]
    fn export_import() {
        let bearer = DidKey::default()
            .create(Arc::new(EphemeralKeyManager::new()), &CreateOptions::default())
            .expect("should create");
        let portable = bearer.export().expect("should export");
        assert_eq!(portable.private_keys.as_ref().map(Vec::len), Some(1));

        let imported = DidKey::import(portable.clone(), Arc::new(EphemeralKeyManager::new()))
            .expect("should import");
        assert_eq!(imported.uri, bearer.uri);
        assert_eq!(imported.document, bearer.document);

        let mut other = portable;
        other.uri = "did:ion:EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg".to_string();
        let err = DidKey::import(other, Arc::new(EphemeralKeyManager::new()))
            .expect_err("wrong method");
        assert!(err.is(Err::MethodNotSupported));
    }
}
