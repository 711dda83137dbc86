//! X25519 key agreement keys.

use base64ct::{Base64UrlUnpadded, Encoding};
use did_core::error::Err;
use did_core::jwk::OkpKey;
use did_core::{tracerr, Jwk, Result};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

const CURVE: &str = "X25519";

/// Generate a new secret.
pub fn generate() -> StaticSecret {
    StaticSecret::random_from_rng(OsRng)
}

/// Express the public key as a JWK.
pub fn public_jwk(secret: &StaticSecret) -> Jwk {
    let public = PublicKey::from(secret);
    Jwk::okp(CURVE, Base64UrlUnpadded::encode_string(public.as_bytes()))
}

/// Express the secret as a private JWK.
pub fn private_jwk(secret: &StaticSecret) -> Jwk {
    let public = PublicKey::from(secret);
    Jwk::Okp(OkpKey {
        crv: CURVE.to_string(),
        x: Base64UrlUnpadded::encode_string(public.as_bytes()),
        d: Some(Base64UrlUnpadded::encode_string(secret.as_bytes())),
        ..OkpKey::default()
    })
}

/// Load a secret from a private JWK.
pub fn from_jwk(jwk: &OkpKey) -> Result<StaticSecret> {
    let Some(d) = &jwk.d else {
        tracerr!(Err::InvalidInput, "X25519 JWK has no private key");
    };
    let bytes = Base64UrlUnpadded::decode_vec(d)?;
    let Ok(secret) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        tracerr!(Err::InvalidInput, "X25519 private key must be 32 bytes");
    };
    Ok(StaticSecret::from(secret))
}
