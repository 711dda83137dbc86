//! Ed25519 keys (`EdDSA`).

use base64ct::{Base64UrlUnpadded, Encoding};
use did_core::error::Err;
use did_core::jwk::OkpKey;
use did_core::{tracerr, Jwk, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

const CURVE: &str = "Ed25519";

/// Generate a new signing key.
pub fn generate() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Express the public key as a JWK.
pub fn public_jwk(key: &VerifyingKey) -> Jwk {
    Jwk::okp(CURVE, Base64UrlUnpadded::encode_string(key.as_bytes()))
}

/// Express the key pair as a private JWK.
pub fn private_jwk(key: &SigningKey) -> Jwk {
    Jwk::Okp(OkpKey {
        crv: CURVE.to_string(),
        x: Base64UrlUnpadded::encode_string(key.verifying_key().as_bytes()),
        d: Some(Base64UrlUnpadded::encode_string(key.as_bytes())),
        ..OkpKey::default()
    })
}

/// Load a signing key from a private JWK.
pub fn from_jwk(jwk: &OkpKey) -> Result<SigningKey> {
    let Some(d) = &jwk.d else {
        tracerr!(Err::InvalidInput, "Ed25519 JWK has no private key");
    };
    let bytes = Base64UrlUnpadded::decode_vec(d)?;
    let Ok(secret) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        tracerr!(Err::InvalidInput, "Ed25519 private key must be 32 bytes");
    };
    Ok(SigningKey::from_bytes(&secret))
}

/// Sign a message.
pub fn sign(key: &SigningKey, msg: &[u8]) -> Vec<u8> {
    key.sign(msg).to_bytes().to_vec()
}

/// Verify a signature against a public JWK.
pub fn verify(jwk: &OkpKey, msg: &[u8], sig: &[u8]) -> Result<()> {
    let bytes = Base64UrlUnpadded::decode_vec(&jwk.x)?;
    let Ok(public) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        tracerr!(Err::InvalidPublicKeyLength, "Ed25519 public key must be 32 bytes");
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public) else {
        tracerr!(Err::InvalidPublicKey, "invalid Ed25519 public key");
    };
    let Ok(signature) = Signature::from_slice(sig) else {
        tracerr!(Err::VerificationFailed, "malformed EdDSA signature");
    };
    if let Err(e) = verifying_key.verify(msg, &signature) {
        tracerr!(Err::VerificationFailed, "error verifying signature: {e}");
    }
    Ok(())
}
