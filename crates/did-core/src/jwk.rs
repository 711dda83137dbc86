//! # JSON Web Key
//!
//! A JWK is modelled as a union tagged by `kty`, each variant carrying only the members valid for
//! its key type. Canonicalization (used for key commitments, DID suffixes and thumbprints) is a
//! total match over the tag.
//!
//! See [RFC 7517](https://www.rfc-editor.org/rfc/rfc7517) and
//! [RFC 7638](https://www.rfc-editor.org/rfc/rfc7638).

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::Result;

/// Optional members common to every key type.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct JwkParams {
    /// Key ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Algorithm intended for use with the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Intended use of the public key (`sig` or `enc`).
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
}

/// Elliptic curve key (`kty` = `EC`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EcKey {
    /// Curve name, e.g. `secp256k1` or `P-256`.
    pub crv: String,

    /// X coordinate, base64url encoded.
    pub x: String,

    /// Y coordinate, base64url encoded.
    pub y: String,

    /// Private key, base64url encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// Common members.
    #[serde(flatten)]
    pub params: JwkParams,
}

/// Octet key pair (`kty` = `OKP`), used for Ed25519 and X25519 keys.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OkpKey {
    /// Curve name, `Ed25519` or `X25519`.
    pub crv: String,

    /// Public key, base64url encoded.
    pub x: String,

    /// Private key, base64url encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// Common members.
    #[serde(flatten)]
    pub params: JwkParams,
}

/// Symmetric key (`kty` = `oct`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OctKey {
    /// Key value, base64url encoded.
    pub k: String,

    /// Common members.
    #[serde(flatten)]
    pub params: JwkParams,
}

/// RSA key (`kty` = `RSA`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RsaKey {
    /// Modulus.
    pub n: String,

    /// Public exponent.
    pub e: String,

    /// Private exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// First prime factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,

    /// Second prime factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// First factor CRT exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,

    /// Second factor CRT exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,

    /// First CRT coefficient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,

    /// Common members.
    #[serde(flatten)]
    pub params: JwkParams,
}

/// A JSON Web Key.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kty")]
pub enum Jwk {
    /// Elliptic curve key.
    #[serde(rename = "EC")]
    Ec(EcKey),

    /// Octet key pair.
    #[serde(rename = "OKP")]
    Okp(OkpKey),

    /// Symmetric key.
    #[serde(rename = "oct")]
    Oct(OctKey),

    /// RSA key.
    #[serde(rename = "RSA")]
    Rsa(RsaKey),
}

/// Type-defining members of a key, in lexicographic order. Serializing this type yields the
/// canonical JWK.
#[derive(Serialize)]
#[serde(untagged)]
enum Canonical<'a> {
    Ec { crv: &'a str, kty: &'static str, x: &'a str, y: &'a str },
    Okp { crv: &'a str, kty: &'static str, x: &'a str },
    Oct { k: &'a str, kty: &'static str },
    Rsa { e: &'a str, kty: &'static str, n: &'a str },
}

impl Jwk {
    /// Convenience constructor for an `OKP` public key.
    #[must_use]
    pub fn okp(crv: impl Into<String>, x: impl Into<String>) -> Self {
        Self::Okp(OkpKey {
            crv: crv.into(),
            x: x.into(),
            ..OkpKey::default()
        })
    }

    /// Convenience constructor for an `EC` public key.
    #[must_use]
    pub fn ec(crv: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self::Ec(EcKey {
            crv: crv.into(),
            x: x.into(),
            y: y.into(),
            ..EcKey::default()
        })
    }

    /// The `kty` value.
    #[must_use]
    pub const fn kty(&self) -> &'static str {
        match self {
            Self::Ec(_) => "EC",
            Self::Okp(_) => "OKP",
            Self::Oct(_) => "oct",
            Self::Rsa(_) => "RSA",
        }
    }

    /// The curve name, for curve-based keys.
    #[must_use]
    pub fn crv(&self) -> Option<&str> {
        match self {
            Self::Ec(k) => Some(&k.crv),
            Self::Okp(k) => Some(&k.crv),
            Self::Oct(_) | Self::Rsa(_) => None,
        }
    }

    /// Common members.
    #[must_use]
    pub const fn params(&self) -> &JwkParams {
        match self {
            Self::Ec(k) => &k.params,
            Self::Okp(k) => &k.params,
            Self::Oct(k) => &k.params,
            Self::Rsa(k) => &k.params,
        }
    }

    /// Mutable access to the common members.
    pub fn params_mut(&mut self) -> &mut JwkParams {
        match self {
            Self::Ec(k) => &mut k.params,
            Self::Okp(k) => &mut k.params,
            Self::Oct(k) => &mut k.params,
            Self::Rsa(k) => &mut k.params,
        }
    }

    /// True when the key carries private material. Symmetric keys are always private.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        match self {
            Self::Ec(k) => k.d.is_some(),
            Self::Okp(k) => k.d.is_some(),
            Self::Oct(_) => true,
            Self::Rsa(k) => k.d.is_some(),
        }
    }

    /// A copy of the key with all private members removed.
    #[must_use]
    pub fn to_public(&self) -> Self {
        match self {
            Self::Ec(k) => Self::Ec(EcKey { d: None, ..k.clone() }),
            Self::Okp(k) => Self::Okp(OkpKey { d: None, ..k.clone() }),
            Self::Oct(k) => Self::Oct(k.clone()),
            Self::Rsa(k) => Self::Rsa(RsaKey {
                n: k.n.clone(),
                e: k.e.clone(),
                params: k.params.clone(),
                ..RsaKey::default()
            }),
        }
    }

    /// The key reduced to its type-defining members only (`EC`: crv, kty, x, y; `OKP`: crv, kty,
    /// x; `oct`: k, kty; `RSA`: e, kty, n).
    #[must_use]
    pub fn canonical(&self) -> Self {
        match self {
            Self::Ec(k) => Self::ec(&k.crv, &k.x, &k.y),
            Self::Okp(k) => Self::okp(&k.crv, &k.x),
            Self::Oct(k) => Self::Oct(OctKey {
                k: k.k.clone(),
                params: JwkParams::default(),
            }),
            Self::Rsa(k) => Self::Rsa(RsaKey {
                n: k.n.clone(),
                e: k.e.clone(),
                ..RsaKey::default()
            }),
        }
    }

    fn canonical_members(&self) -> Canonical<'_> {
        match self {
            Self::Ec(k) => Canonical::Ec {
                crv: &k.crv,
                kty: "EC",
                x: &k.x,
                y: &k.y,
            },
            Self::Okp(k) => Canonical::Okp {
                crv: &k.crv,
                kty: "OKP",
                x: &k.x,
            },
            Self::Oct(k) => Canonical::Oct { k: &k.k, kty: "oct" },
            Self::Rsa(k) => Canonical::Rsa {
                e: &k.e,
                kty: "RSA",
                n: &k.n,
            },
        }
    }

    /// Canonical JSON: type-defining members only, in lexicographic order, no whitespace.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the key cannot be serialized.
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json_canonicalizer::to_string(&self.canonical_members())?)
    }

    /// RFC 7638 thumbprint: base64url(SHA-256(canonical JSON)).
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the key cannot be serialized.
    pub fn thumbprint(&self) -> Result<String> {
        let digest = Sha256::digest(self.canonical_json()?.as_bytes());
        Ok(Base64UrlUnpadded::encode_string(&digest))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ed25519_key() -> Jwk {
        Jwk::okp("Ed25519", "Lm_M42cB3HkUiODQsXRcweM6TByfzEHGO9ND274JcOY")
    }

    #[test]
    fn deserialize_by_kty() {
        let jwk: Jwk = serde_json::from_value(json!({
            "kty": "EC",
            "crv": "secp256k1",
            "x": "nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A",
            "y": "iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k",
            "kid": "recovery",
            "ext": true
        }))
        .expect("should deserialize");

        let Jwk::Ec(ec) = &jwk else {
            panic!("expected EC key");
        };
        assert_eq!(ec.crv, "secp256k1");
        assert_eq!(ec.params.kid.as_deref(), Some("recovery"));
        assert!(!jwk.is_private());
    }

    #[test]
    fn missing_member_rejected() {
        let res = serde_json::from_value::<Jwk>(json!({"kty": "OKP", "crv": "Ed25519"}));
        assert!(res.is_err());
    }

    #[test]
    fn canonical_members_only() {
        let jwk: Jwk = serde_json::from_value(json!({
            "x": "nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A",
            "kid": "key-1",
            "y": "iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k",
            "alg": "ES256K",
            "kty": "EC",
            "d": "c2VjcmV0",
            "crv": "secp256k1"
        }))
        .expect("should deserialize");

        insta::assert_snapshot!(jwk.canonical_json().expect("should serialize"), @r#"{"crv":"secp256k1","kty":"EC","x":"nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A","y":"iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k"}"#);
    }

    #[test]
    fn canonical_idempotent() {
        let mut jwk = ed25519_key();
        jwk.params_mut().kid = Some("abc".to_string());

        let once = jwk.canonical();
        let twice = once.canonical();
        assert_eq!(once, twice);
        assert_eq!(once, ed25519_key());
        assert_eq!(
            once.canonical_json().expect("should serialize"),
            jwk.canonical_json().expect("should serialize")
        );
    }

    #[test]
    fn member_order_irrelevant() {
        let a: Jwk = serde_json::from_str(r#"{"kty":"RSA","n":"0vx7","e":"AQAB","kid":"1"}"#)
            .expect("should deserialize");
        let b: Jwk = serde_json::from_str(r#"{"e":"AQAB","n":"0vx7","kty":"RSA"}"#)
            .expect("should deserialize");

        let json = a.canonical_json().expect("should serialize");
        assert_eq!(json, b.canonical_json().expect("should serialize"));
        assert_eq!(json, r#"{"e":"AQAB","kty":"RSA","n":"0vx7"}"#);

        let oct: Jwk = serde_json::from_str(r#"{"k":"c2VjcmV0","kty":"oct","alg":"HS256"}"#)
            .expect("should deserialize");
        assert_eq!(oct.canonical_json().expect("should serialize"), r#"{"k":"c2VjcmV0","kty":"oct"}"#);
    }

    #[test]
    fn thumbprint() {
        let jwk = Jwk::okp("Ed25519", "GM_NcTChsLlfdODKG573OSWGO7wNwzhkHRPHPxdAYfc");
        insta::assert_snapshot!(jwk.thumbprint().expect("should hash"), @"5pEn2Nf9ZormlGeOxvSznvLdroaIEJczDzHEUgYWG3w");
    }

    #[test]
    fn to_public_strips_private() {
        let Jwk::Okp(mut okp) = ed25519_key() else {
            panic!("expected OKP key");
        };
        okp.d = Some("c2VjcmV0".to_string());
        let private = Jwk::Okp(okp);
        assert!(private.is_private());

        let public = private.to_public();
        assert!(!public.is_private());
        let json = serde_json::to_value(&public).expect("should serialize");
        assert_eq!(
            json,
            json!({"kty": "OKP", "crv": "Ed25519", "x": "Lm_M42cB3HkUiODQsXRcweM6TByfzEHGO9ND274JcOY"})
        );
    }
}
