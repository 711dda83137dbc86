//! # Key Ring
//!
//! An in-memory implementation of the [`KeyManager`] trait, supporting Ed25519, secp256k1 and
//! X25519 keys, and signature verification against public JWKs.
//!
//! Keys held by [`EphemeralKeyManager`] are lost when the manager is dropped. Use
//! [`KeyManager::export_key`] to persist them.

mod ed25519;
mod keyring;
mod secp256k1;
mod x25519;

use did_core::error::Err;
pub use did_core::keys::{Algorithm, KeyManager};
use did_core::{tracerr, Jwk, Result};

pub use crate::keyring::EphemeralKeyManager;

/// Verify a signature over `data` using a public JWK. Ed25519 keys verify `EdDSA` signatures
/// and secp256k1 keys verify `ES256K` signatures.
///
/// # Errors
///
/// Returns [`Err::VerificationFailed`] if the signature does not verify, or
/// [`Err::UnsupportedAlgorithm`] if the key cannot verify signatures.
pub fn verify(public_key: &Jwk, data: &[u8], signature: &[u8]) -> Result<()> {
    match (Algorithm::from_jwk(public_key)?, public_key) {
        (Algorithm::Ed25519, Jwk::Okp(okp)) => ed25519::verify(okp, data, signature),
        (Algorithm::Secp256k1, Jwk::Ec(ec)) => secp256k1::verify(ec, data, signature),
        (alg, _) => tracerr!(Err::UnsupportedAlgorithm, "{alg} keys cannot verify signatures"),
    }
}
