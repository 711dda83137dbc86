//! secp256k1 keys. Signatures are ES256K: ECDSA over the SHA-256 digest of the message, encoded
//! as 64-byte `r || s`.

use base64ct::{Base64UrlUnpadded, Encoding};
use did_core::error::Err;
use did_core::jwk::EcKey;
use did_core::{tracerr, Jwk, Result};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use rand::rngs::OsRng;

const CURVE: &str = "secp256k1";

/// Generate a new signing key.
pub fn generate() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

/// Express the public key as a JWK.
pub fn public_jwk(key: &VerifyingKey) -> Result<Jwk> {
    let point = PublicKey::from(key).to_encoded_point(false);
    let (Some(x), Some(y)) = (point.x(), point.y()) else {
        tracerr!(Err::InvalidPublicKey, "secp256k1 key is the identity point");
    };
    Ok(Jwk::ec(CURVE, Base64UrlUnpadded::encode_string(x), Base64UrlUnpadded::encode_string(y)))
}

/// Express the key pair as a private JWK.
pub fn private_jwk(key: &SigningKey) -> Result<Jwk> {
    let Jwk::Ec(mut ec) = public_jwk(key.verifying_key())? else {
        tracerr!(Err::InternalError, "expected EC key");
    };
    ec.d = Some(Base64UrlUnpadded::encode_string(&key.to_bytes()));
    Ok(Jwk::Ec(ec))
}

/// Load a signing key from a private JWK.
pub fn from_jwk(jwk: &EcKey) -> Result<SigningKey> {
    if jwk.crv != CURVE {
        tracerr!(Err::UnsupportedAlgorithm, "unsupported EC curve: {}", jwk.crv);
    }
    let Some(d) = &jwk.d else {
        tracerr!(Err::InvalidInput, "secp256k1 JWK has no private key");
    };
    let bytes = Base64UrlUnpadded::decode_vec(d)?;
    let Ok(key) = SigningKey::from_slice(&bytes) else {
        tracerr!(Err::InvalidInput, "invalid secp256k1 private key");
    };
    Ok(key)
}

/// Sign a message.
pub fn sign(key: &SigningKey, msg: &[u8]) -> Vec<u8> {
    let sig: Signature = key.sign(msg);
    sig.to_bytes().to_vec()
}

/// Verify a signature against a public JWK.
pub fn verify(jwk: &EcKey, msg: &[u8], sig: &[u8]) -> Result<()> {
    let x = Base64UrlUnpadded::decode_vec(&jwk.x)?;
    let y = Base64UrlUnpadded::decode_vec(&jwk.y)?;
    let mut sec1 = vec![0x04];
    sec1.extend_from_slice(&x);
    sec1.extend_from_slice(&y);

    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&sec1) else {
        tracerr!(Err::InvalidPublicKey, "invalid secp256k1 public key");
    };
    let Ok(signature) = Signature::from_slice(sig) else {
        tracerr!(Err::VerificationFailed, "malformed ES256K signature");
    };
    if let Err(e) = verifying_key.verify(msg, &signature) {
        tracerr!(Err::VerificationFailed, "error verifying signature: {e}");
    }
    Ok(())
}
