//! # Keys
//!
//! The key manager contract used by DID methods to generate, use and export key material. Key
//! managers are addressed by key URI, by default `urn:jwk:<thumbprint>` of the public key.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Err, Error};
use crate::jwk::Jwk;
use crate::{tracerr, Result};

/// Prefix of key URIs derived from JWK thumbprints.
pub const KEY_URI_PREFIX: &str = "urn:jwk:";

/// Key algorithms supported by the engine.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Ed25519 signatures (`EdDSA`).
    #[default]
    Ed25519,

    /// secp256k1 ECDSA signatures with SHA-256 (`ES256K`).
    Secp256k1,

    /// X25519 key agreement. Cannot sign.
    X25519,
}

impl Algorithm {
    /// The JOSE algorithm name, for signing algorithms.
    #[must_use]
    pub const fn jose(&self) -> Option<&'static str> {
        match self {
            Self::Ed25519 => Some("EdDSA"),
            Self::Secp256k1 => Some("ES256K"),
            Self::X25519 => None,
        }
    }

    /// The algorithm for a JWK, inferred from its key type and curve.
    ///
    /// # Errors
    ///
    /// Returns [`Err::UnsupportedAlgorithm`] if the key type or curve is not supported.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        match (jwk.kty(), jwk.crv()) {
            ("OKP", Some("Ed25519")) => Ok(Self::Ed25519),
            ("OKP", Some("X25519")) => Ok(Self::X25519),
            ("EC", Some("secp256k1")) => Ok(Self::Secp256k1),
            (kty, crv) => {
                tracerr!(Err::UnsupportedAlgorithm, "unsupported key: {kty} {}", crv.unwrap_or("-"))
            }
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 => f.write_str("Ed25519"),
            Self::Secp256k1 => f.write_str("secp256k1"),
            Self::X25519 => f.write_str("X25519"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Ed25519" | "EdDSA" => Ok(Self::Ed25519),
            "secp256k1" | "Secp256k1" | "ES256K" => Ok(Self::Secp256k1),
            "X25519" => Ok(Self::X25519),
            _ => tracerr!(Err::UnsupportedAlgorithm, "unsupported algorithm: {s}"),
        }
    }
}

/// Manages private keys on behalf of a DID. Private key material never leaves the manager except
/// through [`KeyManager::export_key`].
pub trait KeyManager: Send + Sync {
    /// Generate a key and return its key URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is not supported.
    fn generate_key(&self, algorithm: Algorithm) -> Result<String>;

    /// The public JWK for a key.
    ///
    /// # Errors
    ///
    /// Returns [`Err::KeyNotFound`] if the manager does not hold the key.
    fn public_key(&self, key_uri: &str) -> Result<Jwk>;

    /// Sign `data` with a key. Ed25519 keys produce 64-byte signatures, secp256k1 keys produce
    /// 64-byte `r || s` signatures over the SHA-256 digest of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Err::KeyNotFound`] if the manager does not hold the key, or
    /// [`Err::SigningError`] if the key cannot sign.
    fn sign(&self, key_uri: &str, data: &[u8]) -> Result<Vec<u8>>;

    /// Export a key as a private JWK.
    ///
    /// # Errors
    ///
    /// Returns [`Err::KeyNotFound`] if the manager does not hold the key.
    fn export_key(&self, key_uri: &str) -> Result<Jwk>;

    /// Import a private JWK and return its key URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a supported private key.
    fn import_key(&self, private_key: &Jwk) -> Result<String>;

    /// The key URI for a public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be serialized.
    fn key_uri(&self, public_key: &Jwk) -> Result<String> {
        key_uri(public_key)
    }
}

/// The default key URI for a public key: `urn:jwk:<thumbprint>`.
///
/// # Errors
///
/// Returns an error if the key cannot be serialized.
pub fn key_uri(public_key: &Jwk) -> Result<String> {
    Ok(format!("{KEY_URI_PREFIX}{}", public_key.thumbprint()?))
}
