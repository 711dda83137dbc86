//! # Multikey
//!
//! Multicodec-prefixed, multibase (base58btc) encoded public keys, as used in `did:key`
//! identifiers and `publicKeyMultibase` verification method properties.

use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::VerifyingKey;
use k256::elliptic_curve::sec1::{EncodedPoint, FromEncodedPoint, ToEncodedPoint};
use k256::{AffinePoint, PublicKey, Secp256k1};
use multibase::Base;

use crate::error::Err;
use crate::jwk::Jwk;
use crate::{tracerr, Result};

/// A public key multicodec entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Codec {
    /// Multicodec table name.
    pub name: &'static str,

    /// Multicodec code.
    pub code: u64,

    /// Expected length of the raw public key in bytes.
    pub key_len: usize,
}

/// Compressed secp256k1 public key.
pub const SECP256K1_PUB: Codec = Codec {
    name: "secp256k1-pub",
    code: 0xe7,
    key_len: 33,
};

/// Ed25519 public key.
pub const ED25519_PUB: Codec = Codec {
    name: "ed25519-pub",
    code: 0xed,
    key_len: 32,
};

/// X25519 public key.
pub const X25519_PUB: Codec = Codec {
    name: "x25519-pub",
    code: 0xec,
    key_len: 32,
};

const CODECS: [Codec; 3] = [SECP256K1_PUB, ED25519_PUB, X25519_PUB];

impl Codec {
    /// Look up a codec by its multicodec code.
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        CODECS.into_iter().find(|c| c.code == code)
    }

    /// Look up a codec by its multicodec name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        CODECS.into_iter().find(|c| c.name == name)
    }
}

/// Encode a raw public key as a multibase (`z` + base58btc) multikey.
///
/// # Errors
///
/// Returns [`Err::InvalidPublicKeyLength`] if the key length is wrong for the codec.
pub fn encode(codec: Codec, key: &[u8]) -> Result<String> {
    if key.len() != codec.key_len {
        tracerr!(
            Err::InvalidPublicKeyLength,
            "{} key must be {} bytes, got {}",
            codec.name,
            codec.key_len,
            key.len()
        );
    }
    let mut buf = unsigned_varint::encode::u64_buffer();
    let mut data = unsigned_varint::encode::u64(codec.code, &mut buf).to_vec();
    data.extend_from_slice(key);
    Ok(multibase::encode(Base::Base58Btc, data))
}

/// Decode a multibase multikey into its codec and raw public key bytes.
///
/// # Errors
///
/// * [`Err::InvalidPublicKey`] if the value is not base58btc multibase.
/// * [`Err::UnsupportedPublicKeyType`] if the multicodec is not a known public key type.
/// * [`Err::InvalidPublicKeyLength`] if the key length does not match the codec.
pub fn decode(multibase_value: &str) -> Result<(Codec, Vec<u8>)> {
    let Ok((base, data)) = multibase::decode(multibase_value) else {
        tracerr!(Err::InvalidPublicKey, "value is not multibase encoded: {multibase_value}");
    };
    if base != Base::Base58Btc {
        tracerr!(Err::InvalidPublicKey, "multikey must be base58btc encoded");
    }
    let Ok((code, key)) = unsigned_varint::decode::u64(&data) else {
        tracerr!(Err::InvalidPublicKey, "missing multicodec prefix");
    };
    let Some(codec) = Codec::from_code(code) else {
        tracerr!(Err::UnsupportedPublicKeyType, "unsupported multicodec: {code:#x}");
    };
    if key.len() != codec.key_len {
        tracerr!(
            Err::InvalidPublicKeyLength,
            "{} key must be {} bytes, got {}",
            codec.name,
            codec.key_len,
            key.len()
        );
    }
    Ok((codec, key.to_vec()))
}

/// Check the raw bytes are a valid public key for the codec's curve.
///
/// # Errors
///
/// Returns [`Err::InvalidPublicKey`] if the bytes are not a valid point.
pub fn validate(codec: Codec, key: &[u8]) -> Result<()> {
    let valid = match codec.code {
        0xed => <[u8; 32]>::try_from(key)
            .ok()
            .is_some_and(|bytes| VerifyingKey::from_bytes(&bytes).is_ok()),
        0xe7 => PublicKey::from_sec1_bytes(key).is_ok(),
        // every 32-byte string is a valid X25519 public key
        0xec => key.len() == X25519_PUB.key_len,
        _ => false,
    };
    if !valid {
        tracerr!(Err::InvalidPublicKey, "invalid {} public key", codec.name);
    }
    Ok(())
}

/// Convert a raw public key to a JWK.
///
/// # Errors
///
/// Returns [`Err::InvalidPublicKey`] if a secp256k1 key cannot be decompressed.
pub fn to_jwk(codec: Codec, key: &[u8]) -> Result<Jwk> {
    match codec.code {
        0xed => Ok(Jwk::okp("Ed25519", Base64UrlUnpadded::encode_string(key))),
        0xec => Ok(Jwk::okp("X25519", Base64UrlUnpadded::encode_string(key))),
        0xe7 => {
            let Ok(public) = PublicKey::from_sec1_bytes(key) else {
                tracerr!(Err::InvalidPublicKey, "invalid secp256k1 public key");
            };
            let point = public.to_encoded_point(false);
            let (Some(x), Some(y)) = (point.x(), point.y()) else {
                tracerr!(Err::InvalidPublicKey, "secp256k1 key is the identity point");
            };
            Ok(Jwk::ec(
                "secp256k1",
                Base64UrlUnpadded::encode_string(x),
                Base64UrlUnpadded::encode_string(y),
            ))
        }
        _ => tracerr!(Err::UnsupportedPublicKeyType, "unsupported multicodec: {}", codec.name),
    }
}

/// Convert a public JWK to its codec and raw public key bytes. secp256k1 keys are compressed.
///
/// # Errors
///
/// * [`Err::UnsupportedPublicKeyType`] if the key type or curve has no multicodec.
/// * [`Err::InvalidPublicKey`] if the key members cannot be decoded.
pub fn from_jwk(jwk: &Jwk) -> Result<(Codec, Vec<u8>)> {
    match jwk {
        Jwk::Okp(okp) => {
            let codec = match okp.crv.as_str() {
                "Ed25519" => ED25519_PUB,
                "X25519" => X25519_PUB,
                crv => tracerr!(Err::UnsupportedPublicKeyType, "unsupported OKP curve: {crv}"),
            };
            let key = Base64UrlUnpadded::decode_vec(&okp.x)?;
            if key.len() != codec.key_len {
                tracerr!(Err::InvalidPublicKeyLength, "{} key must be 32 bytes", codec.name);
            }
            Ok((codec, key))
        }
        Jwk::Ec(ec) if ec.crv == "secp256k1" => {
            let x = Base64UrlUnpadded::decode_vec(&ec.x)?;
            let y = Base64UrlUnpadded::decode_vec(&ec.y)?;
            if x.len() != 32 || y.len() != 32 {
                tracerr!(Err::InvalidPublicKeyLength, "secp256k1 coordinates must be 32 bytes");
            }
            let encoded = EncodedPoint::<Secp256k1>::from_affine_coordinates(
                x.as_slice().into(),
                y.as_slice().into(),
                false,
            );
            let point = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded));
            let Some(point) = point else {
                tracerr!(Err::InvalidPublicKey, "secp256k1 coordinates are not on the curve");
            };
            Ok((SECP256K1_PUB, point.to_encoded_point(true).as_bytes().to_vec()))
        }
        _ => tracerr!(Err::UnsupportedPublicKeyType, "no multicodec for {} key", jwk.kty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ED25519_MULTIKEY: &str = "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";
    const SECP256K1_MULTIKEY: &str = "zQ3shokFTS3brHcDQrn82RUDfCZESWL1ZdCEJwekUDPQiYBme";

    #[test]
    fn ed25519_round_trip() {
        let (codec, key) = decode(ED25519_MULTIKEY).expect("should decode");
        assert_eq!(codec, ED25519_PUB);
        assert_eq!(key.len(), 32);
        validate(codec, &key).expect("should be valid");
        assert_eq!(encode(codec, &key).expect("should encode"), ED25519_MULTIKEY);

        let jwk = to_jwk(codec, &key).expect("should convert");
        let Jwk::Okp(okp) = &jwk else {
            panic!("expected OKP key");
        };
        assert_eq!(okp.x, "Lm_M42cB3HkUiODQsXRcweM6TByfzEHGO9ND274JcOY");
        assert_eq!(from_jwk(&jwk).expect("should convert back"), (codec, key));
    }

    #[test]
    fn secp256k1_jwk() {
        let (codec, key) = decode(SECP256K1_MULTIKEY).expect("should decode");
        assert_eq!(codec, SECP256K1_PUB);
        validate(codec, &key).expect("should be valid");

        let jwk = to_jwk(codec, &key).expect("should convert");
        let Jwk::Ec(ec) = &jwk else {
            panic!("expected EC key");
        };
        assert_eq!(ec.x, "h0wVx_2iDlOcblulc8E5iEw1EYh5n1RYtLQfeSTyNc0");
        assert_eq!(ec.y, "O2EATIGbu6DezKFptj5scAIRntgfecanVNXxat1rnwE");
        assert_eq!(from_jwk(&jwk).expect("should compress"), (codec, key));
    }

    #[test]
    fn wrong_length() {
        let mut buf = unsigned_varint::encode::u64_buffer();
        let mut data = unsigned_varint::encode::u64(0xed, &mut buf).to_vec();
        data.extend_from_slice(&[1u8; 31]);
        let value = multibase::encode(Base::Base58Btc, data);

        let err = decode(&value).expect_err("should fail");
        assert!(err.is(Err::InvalidPublicKeyLength));

        let err = encode(SECP256K1_PUB, &[2u8; 32]).expect_err("should fail");
        assert!(err.is(Err::InvalidPublicKeyLength));
    }

    #[test]
    fn unknown_codec_and_base() {
        let mut buf = unsigned_varint::encode::u64_buffer();
        let mut data = unsigned_varint::encode::u64(0x1200, &mut buf).to_vec();
        data.extend_from_slice(&[1u8; 33]);
        let value = multibase::encode(Base::Base58Btc, &data);
        assert!(decode(&value).expect_err("should fail").is(Err::UnsupportedPublicKeyType));

        let value = multibase::encode(Base::Base64Url, &data);
        assert!(decode(&value).expect_err("should fail").is(Err::InvalidPublicKey));
    }

    #[test]
    fn invalid_point() {
        let mut key = vec![0x05u8];
        key.extend_from_slice(&[0xffu8; 32]);
        let err = validate(SECP256K1_PUB, &key).expect_err("should fail");
        assert!(err.is(Err::InvalidPublicKey));
    }
}
