//! # DID Key
//!
//! Implementation of the `did:key` method. <https://w3c-ccg.github.io/did-method-key/>
//!
//! A `did:key` identifier is the multibase encoded, multicodec prefixed public key itself, so
//! creation and resolution are deterministic and never touch the network. The DID document is
//! derived from the identifier alone.

mod create;
mod resolve;

use std::fmt::{self, Display};
use std::str::FromStr;

use did_core::document::context::{
    ECDSA_SECP256K1_VERIFICATION_KEY_2019, ED25519_VERIFICATION_KEY_2020, JSON_WEB_KEY_2020,
    MULTIKEY, X25519_KEY_AGREEMENT_KEY_2020,
};
use did_core::error::{Err, Error};
use did_core::{tracerr, Result};
use serde::{Deserialize, Serialize};

pub use crate::create::CreateOptions;

/// The method name.
pub const METHOD: &str = "key";

/// Verification method type used to express the public key in a resolved document.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum PublicKeyFormat {
    /// Key expressed as `publicKeyJwk`.
    #[default]
    JsonWebKey2020,

    /// Ed25519 key expressed as `publicKeyMultibase`.
    Ed25519VerificationKey2020,

    /// Key expressed as `publicKeyMultibase`.
    Multikey,

    /// X25519 key expressed as `publicKeyMultibase`. Experimental.
    X25519KeyAgreementKey2020,

    /// secp256k1 key expressed as `publicKeyJwk`. Experimental.
    EcdsaSecp256k1VerificationKey2019,
}

impl PublicKeyFormat {
    /// The verification method type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JsonWebKey2020 => JSON_WEB_KEY_2020,
            Self::Ed25519VerificationKey2020 => ED25519_VERIFICATION_KEY_2020,
            Self::Multikey => MULTIKEY,
            Self::X25519KeyAgreementKey2020 => X25519_KEY_AGREEMENT_KEY_2020,
            Self::EcdsaSecp256k1VerificationKey2019 => ECDSA_SECP256K1_VERIFICATION_KEY_2019,
        }
    }

    /// Experimental formats must be enabled with
    /// [`DidKeyOptions::enable_experimental_public_key_types`].
    #[must_use]
    pub const fn is_experimental(&self) -> bool {
        matches!(self, Self::X25519KeyAgreementKey2020 | Self::EcdsaSecp256k1VerificationKey2019)
    }
}

impl Display for PublicKeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicKeyFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            JSON_WEB_KEY_2020 => Ok(Self::JsonWebKey2020),
            ED25519_VERIFICATION_KEY_2020 => Ok(Self::Ed25519VerificationKey2020),
            MULTIKEY => Ok(Self::Multikey),
            X25519_KEY_AGREEMENT_KEY_2020 => Ok(Self::X25519KeyAgreementKey2020),
            ECDSA_SECP256K1_VERIFICATION_KEY_2019 => Ok(Self::EcdsaSecp256k1VerificationKey2019),
            _ => tracerr!(Err::UnsupportedPublicKeyType, "unsupported public key format: {s}"),
        }
    }
}

/// Options controlling how `did:key` documents are derived.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DidKeyOptions {
    /// Verification method type of the signature key.
    pub public_key_format: PublicKeyFormat,

    /// Derive an X25519 key agreement key from an Ed25519 key.
    pub enable_encryption_key_derivation: bool,

    /// Allow experimental public key formats.
    pub enable_experimental_public_key_types: bool,
}

/// The `did:key` method.
#[derive(Clone, Debug, Default)]
pub struct DidKey {
    options: DidKeyOptions,
}

impl DidKey {
    /// Create a `did:key` method with the given document options.
    #[must_use]
    pub const fn new(options: DidKeyOptions) -> Self {
        Self { options }
    }

    /// The document options.
    #[must_use]
    pub const fn options(&self) -> &DidKeyOptions {
        &self.options
    }
}
