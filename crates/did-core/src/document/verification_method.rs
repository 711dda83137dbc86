//! Verification methods and the relationships (purposes) they can be used for.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Kind;
use crate::error::{Err, Error};
use crate::jwk::Jwk;
use crate::{multikey, Result};

/// A DID document can express verification methods, such as cryptographic public keys, which can
/// be used to authenticate or authorize interactions with the DID subject or associated parties.
///
/// MAY include additional properties which can be determined from the verification method as
/// registered in the [DID Specification Registries](https://www.w3.org/TR/did-spec-registries/).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Only used when the verification method uses terms not defined in the containing document.
    #[serde(rename = "@context")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Kind<Value>>,

    /// A DID URL that identifies the verification method.
    pub id: String,

    /// The verification method type, e.g. `JsonWebKey2020`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The DID of the controller of the verification method.
    pub controller: String,

    /// The public key material. Exactly one representation is present.
    #[serde(flatten)]
    pub key: KeyFormat,
}

impl VerificationMethod {
    /// Infer the DID from the method ID.
    #[must_use]
    pub fn did(&self) -> &str {
        self.id.split('#').next().unwrap_or_default()
    }

    /// The fragment of the method ID, if any.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.id.split_once('#').map(|(_, f)| f)
    }

    /// The public key as a JWK, converting from multibase if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if a multibase key cannot be decoded.
    pub fn jwk(&self) -> Result<Jwk> {
        self.key.jwk()
    }
}

/// The format of the public key material.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum KeyFormat {
    /// The key is encoded as a JWK.
    JsonWebKey {
        /// The public key encoded as a JWK.
        public_key_jwk: Jwk,
    },

    /// The key is encoded as a Multibase string.
    Multikey {
        /// The public key encoded as a Multibase.
        public_key_multibase: String,
    },
}

impl KeyFormat {
    /// Return the key as a JWK.
    ///
    /// # Errors
    ///
    /// Will return an error if the key is multibase encoded and cannot be decoded.
    pub fn jwk(&self) -> Result<Jwk> {
        match self {
            Self::JsonWebKey { public_key_jwk } => Ok(public_key_jwk.clone()),
            Self::Multikey { public_key_multibase } => {
                let (codec, key) = multikey::decode(public_key_multibase)?;
                multikey::to_jwk(codec, &key)
            }
        }
    }

    /// Return the key as a multibase string.
    ///
    /// # Errors
    ///
    /// Will return an error if the key is a JWK with no multicodec representation.
    pub fn multibase(&self) -> Result<String> {
        match self {
            Self::JsonWebKey { public_key_jwk } => {
                let (codec, key) = multikey::from_jwk(public_key_jwk)?;
                multikey::encode(codec, &key)
            }
            Self::Multikey { public_key_multibase } => Ok(public_key_multibase.clone()),
        }
    }
}

impl From<Jwk> for KeyFormat {
    fn from(jwk: Jwk) -> Self {
        Self::JsonWebKey { public_key_jwk: jwk }
    }
}

/// Verification relationships a key may be used for.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum KeyPurpose {
    /// Authenticate the DID subject.
    Authentication,

    /// Express claims, such as issuing a verifiable credential.
    AssertionMethod,

    /// Generate encryption material for confidential messages.
    KeyAgreement,

    /// Invoke a cryptographic capability.
    CapabilityInvocation,

    /// Delegate a cryptographic capability.
    CapabilityDelegation,
}

impl KeyPurpose {
    /// All purposes in document order.
    pub const ALL: [Self; 5] = [
        Self::Authentication,
        Self::AssertionMethod,
        Self::KeyAgreement,
        Self::CapabilityInvocation,
        Self::CapabilityDelegation,
    ];

    /// The camelCase relationship name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::AssertionMethod => "assertionMethod",
            Self::KeyAgreement => "keyAgreement",
            Self::CapabilityInvocation => "capabilityInvocation",
            Self::CapabilityDelegation => "capabilityDelegation",
        }
    }
}

impl Display for KeyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyPurpose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s).ok_or_else(|| {
            anyhow::Error::from(Err::InvalidInput).context(format!("unknown purpose: {s}")).into()
        })
    }
}
