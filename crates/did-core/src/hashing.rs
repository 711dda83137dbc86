//! Helper functions for hashing and multi-hashing data, as used by Sidetree-based DID methods.
//!
//! Data is serialized using the [JSON Canonicalization Scheme (JCS)](https://www.rfc-editor.org/rfc/rfc8785)
//! before hashing so that member order cannot change the result.

use base64ct::{Base64UrlUnpadded, Encoding};
use multihash::Multihash;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Err;
use crate::{tracerr, Result};

const SHA2_256: u64 = 0x12;

/// Serialize data to canonical JSON bytes.
///
/// # Errors
///
/// * Serialization error if the data cannot be serialized.
pub fn canonicalize(data: &impl Serialize) -> Result<Vec<u8>> {
    Ok(serde_json_canonicalizer::to_vec(data)?)
}

/// Transforms the provided data into a base64url-encoded multihash. It creates canonical JSON,
/// multi-hashes it using SHA-256, and then base64url-encodes the result.
///
/// # Errors
///
/// * Serialization error if the data cannot be serialized.
/// * Multi-hash error if the data cannot be hashed.
pub fn hash_data(data: &impl Serialize) -> Result<String> {
    let buf = canonicalize(data)?;
    let multi = multi_hash(&buf)?;
    Ok(Base64UrlUnpadded::encode_string(&multi))
}

/// Hash a public key to a commitment by hashing its canonical JSON representation and then
/// multi-hashing the hash.
///
/// # Errors
///
/// * Serialization error if the public key cannot be serialized.
/// * Multi-hash error if the public key cannot be hashed.
pub fn hash_commitment(data: &impl Serialize) -> Result<String> {
    let buf = canonicalize(data)?;
    let hashed = Sha256::digest(&buf);
    let multi = multi_hash(&hashed)?;
    Ok(Base64UrlUnpadded::encode_string(&multi))
}

/// Multi-hashes the provided data using SHA-256.
fn multi_hash(data: &[u8]) -> Result<Vec<u8>> {
    let hashed = Sha256::digest(data);
    let mhash = Multihash::<64>::wrap(SHA2_256, &hashed)?;
    Ok(mhash.to_bytes())
}

/// Check the provided string is a valid SHA-256 multihash.
///
/// # Errors
///
/// * `InvalidHash` - The hash is not a valid multi-hash.
pub fn check(hash: &str) -> Result<()> {
    let decoded = Base64UrlUnpadded::decode_vec(hash)?;
    let wrapped = Multihash::<64>::from_bytes(&decoded)?;
    if wrapped.code() != SHA2_256 {
        tracerr!(Err::InvalidHash, "invalid hash code: {}", wrapped.code());
    }
    Ok(())
}

/// Check that `hash` is the multihash of the canonical form of `data`.
///
/// # Errors
///
/// * `InvalidHash` - The hash does not match the data.
pub fn verify_hash(data: &impl Serialize, hash: &str) -> Result<()> {
    check(hash)?;
    if hash_data(data)? != hash {
        tracerr!(Err::InvalidHash, "hash does not match data");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Jwk;

    #[test]
    fn multi_hash_ok() {
        let data = b"Hello, world!";

        let mhash = multi_hash(data).expect("failed to create multi-hash");
        let wrapped = Multihash::<64>::from_bytes(&mhash).expect("failed to wrap multi-hash");

        assert_eq!(wrapped.code(), SHA2_256);
        assert_eq!(wrapped.digest(), &Sha256::digest(data)[..]);
    }

    #[test]
    fn hash_data_ok() {
        #[derive(Serialize)]
        struct Msg {
            msg: String,
        }
        let data = Msg {
            msg: "Hello, world!".to_string(),
        };

        let hash = hash_data(&data).expect("failed to create multi-hash");
        check(&hash).expect("should be a valid multihash");
        verify_hash(&data, &hash).expect("should match");

        let other = Msg {
            msg: "Goodbye".to_string(),
        };
        assert!(verify_hash(&other, &hash).expect_err("should not match").is(Err::InvalidHash));
    }

    #[test]
    fn hash_commitment_ok() {
        let key = Jwk::ec(
            "secp256k1",
            "nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A",
            "iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k",
        );

        let hash = hash_commitment(&key).expect("should hash");
        insta::assert_snapshot!(hash, @"EiBfOZdMtU6OBw8Pk879QtZ-2J-9FbbjSZyoaA_bqD4zhA");
    }

    #[test]
    fn check_rejects_other_codes() {
        let sha512 = Multihash::<64>::wrap(0x13, &[0u8; 64]).expect("should wrap");
        let encoded = Base64UrlUnpadded::encode_string(&sha512.to_bytes());
        assert!(check(&encoded).expect_err("should fail").is(Err::InvalidHash));
    }
}
