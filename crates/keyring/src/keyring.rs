use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use did_core::error::Err;
use did_core::jwk::Jwk;
use did_core::keys::{key_uri, Algorithm, KeyManager};
use did_core::{tracerr, Result};

use crate::{ed25519, secp256k1, x25519};

/// A private key held by the key ring.
#[derive(Clone)]
pub(crate) enum KeyPair {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
    X25519(x25519_dalek::StaticSecret),
}

impl KeyPair {
    fn generate(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Ed25519 => Self::Ed25519(ed25519::generate()),
            Algorithm::Secp256k1 => Self::Secp256k1(secp256k1::generate()),
            Algorithm::X25519 => Self::X25519(x25519::generate()),
        }
    }

    fn from_jwk(jwk: &Jwk) -> Result<Self> {
        match (Algorithm::from_jwk(jwk)?, jwk) {
            (Algorithm::Ed25519, Jwk::Okp(okp)) => Ok(Self::Ed25519(ed25519::from_jwk(okp)?)),
            (Algorithm::X25519, Jwk::Okp(okp)) => Ok(Self::X25519(x25519::from_jwk(okp)?)),
            (Algorithm::Secp256k1, Jwk::Ec(ec)) => Ok(Self::Secp256k1(secp256k1::from_jwk(ec)?)),
            _ => tracerr!(Err::UnsupportedAlgorithm, "unsupported private key"),
        }
    }

    fn public_jwk(&self) -> Result<Jwk> {
        match self {
            Self::Ed25519(key) => Ok(ed25519::public_jwk(&key.verifying_key())),
            Self::Secp256k1(key) => secp256k1::public_jwk(key.verifying_key()),
            Self::X25519(secret) => Ok(x25519::public_jwk(secret)),
        }
    }

    fn private_jwk(&self) -> Result<Jwk> {
        match self {
            Self::Ed25519(key) => Ok(ed25519::private_jwk(key)),
            Self::Secp256k1(key) => secp256k1::private_jwk(key),
            Self::X25519(secret) => Ok(x25519::private_jwk(secret)),
        }
    }

    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Ed25519(key) => Ok(ed25519::sign(key, msg)),
            Self::Secp256k1(key) => Ok(secp256k1::sign(key, msg)),
            Self::X25519(_) => tracerr!(Err::SigningError, "X25519 keys cannot sign"),
        }
    }
}

/// Ephemeral key manager. Keys are held in memory for the lifetime of the manager and are
/// addressed by `urn:jwk:<thumbprint>`.
#[derive(Clone, Default)]
pub struct EphemeralKeyManager {
    keys: Arc<Mutex<HashMap<String, KeyPair>>>,
}

impl EphemeralKeyManager {
    /// Create a new `EphemeralKeyManager` instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> Result<MutexGuard<'_, HashMap<String, KeyPair>>> {
        match self.keys.lock() {
            Ok(guard) => Ok(guard),
            Err(e) => tracerr!(Err::InternalError, "lock on keys mutex failed: {e}"),
        }
    }

    fn key(&self, key_uri: &str) -> Result<KeyPair> {
        let Some(key) = self.keys()?.get(key_uri).cloned() else {
            tracerr!(Err::KeyNotFound, "no key for {key_uri}");
        };
        Ok(key)
    }

    fn insert(&self, key: KeyPair) -> Result<String> {
        let uri = key_uri(&key.public_jwk()?)?;
        tracing::debug!("storing key {uri}");
        self.keys()?.insert(uri.clone(), key);
        Ok(uri)
    }
}

impl KeyManager for EphemeralKeyManager {
    fn generate_key(&self, algorithm: Algorithm) -> Result<String> {
        self.insert(KeyPair::generate(algorithm))
    }

    fn public_key(&self, key_uri: &str) -> Result<Jwk> {
        self.key(key_uri)?.public_jwk()
    }

    fn sign(&self, key_uri: &str, data: &[u8]) -> Result<Vec<u8>> {
        self.key(key_uri)?.sign(data)
    }

    fn export_key(&self, key_uri: &str) -> Result<Jwk> {
        self.key(key_uri)?.private_jwk()
    }

    fn import_key(&self, private_key: &Jwk) -> Result<String> {
        if !private_key.is_private() {
            tracerr!(Err::InvalidInput, "JWK has no private key material");
        }
        self.insert(KeyPair::from_jwk(private_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify;

    #[test]
    fn sign_and_verify() {
        let manager = EphemeralKeyManager::new();

        for alg in [Algorithm::Ed25519, Algorithm::Secp256k1] {
            let uri = manager.generate_key(alg).expect("should generate");
            assert!(uri.starts_with("urn:jwk:"));

            let public = manager.public_key(&uri).expect("should have key");
            assert!(!public.is_private());
            assert_eq!(Algorithm::from_jwk(&public).expect("known key"), alg);

            let sig = manager.sign(&uri, b"payload").expect("should sign");
            assert_eq!(sig.len(), 64);
            verify(&public, b"payload", &sig).expect("should verify");

            let err = verify(&public, b"tampered", &sig).expect_err("should fail");
            assert!(err.is(Err::VerificationFailed));
        }
    }

    #[test]
    fn x25519_cannot_sign() {
        let manager = EphemeralKeyManager::new();
        let uri = manager.generate_key(Algorithm::X25519).expect("should generate");

        let err = manager.sign(&uri, b"payload").expect_err("should fail");
        assert!(err.is(Err::SigningError));
    }

    #[test]
    fn missing_key() {
        let manager = EphemeralKeyManager::new();

        let err = manager.public_key("urn:jwk:missing").expect_err("should fail");
        assert!(err.is(Err::KeyNotFound));
        let err = manager.sign("urn:jwk:missing", b"payload").expect_err("should fail");
        assert!(err.is(Err::KeyNotFound));
    }

    #[test]
    fn export_import() {
        let manager = EphemeralKeyManager::new();

        for alg in [Algorithm::Ed25519, Algorithm::Secp256k1, Algorithm::X25519] {
            let uri = manager.generate_key(alg).expect("should generate");
            let private = manager.export_key(&uri).expect("should export");
            assert!(private.is_private());

            let other = EphemeralKeyManager::new();
            let imported = other.import_key(&private).expect("should import");
            assert_eq!(imported, uri);
            assert_eq!(
                other.public_key(&imported).expect("should have key"),
                manager.public_key(&uri).expect("should have key")
            );
        }
    }

    #[test]
    fn import_public_key() {
        let manager = EphemeralKeyManager::new();
        let jwk = Jwk::okp("Ed25519", "GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc");

        let err = manager.import_key(&jwk).expect_err("should fail");
        assert!(err.is(Err::InvalidInput));
    }

    #[test]
    fn known_key_uri() {
        // RFC 8037 Ed25519 test key
        let private = Jwk::Okp(did_core::jwk::OkpKey {
            crv: "Ed25519".to_string(),
            x: "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo".to_string(),
            d: Some("nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A".to_string()),
            ..did_core::jwk::OkpKey::default()
        });

        let manager = EphemeralKeyManager::new();
        let uri = manager.import_key(&private).expect("should import");
        insta::assert_snapshot!(uri, @"urn:jwk:kPrK_qmxVWaYVA9wwBF6Iuo3vVzz7TxHCTwXBygrS4k");
    }
}
