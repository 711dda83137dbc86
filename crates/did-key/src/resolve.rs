//! # DID Key Resolver
//!
//! Derives the DID document from the identifier. Resolution is a pure function of the DID: no
//! network or cache is consulted.

use async_trait::async_trait;
use curve25519_dalek::edwards::CompressedEdwardsY;
use did_core::core::Kind;
use did_core::document::context::contexts_for;
use did_core::error::Err;
use did_core::multikey::{self, Codec, ED25519_PUB, SECP256K1_PUB, X25519_PUB};
use did_core::resolver::document_result;
use did_core::{
    tracerr, Did, DidDocument, DidResolutionResult, KeyFormat, KeyPurpose, MethodResolver,
    ResolutionOptions, Result, VerificationMethod,
};

use crate::{DidKey, PublicKeyFormat, METHOD};

impl DidKey {
    /// Derive the DID document for a `did:key` DID (or DID URL).
    ///
    /// # Errors
    ///
    /// * [`Err::InvalidDid`] if the DID cannot be parsed.
    /// * [`Err::MethodNotSupported`] if the DID is not a `did:key`.
    /// * [`Err::InvalidPublicKeyLength`], [`Err::InvalidPublicKey`] or
    ///   [`Err::UnsupportedPublicKeyType`] if the encoded key is unusable.
    /// * [`Err::InvalidPublicKeyType`] if the configured format is experimental and not enabled,
    ///   or cannot express the key.
    pub fn document(&self, did: &str) -> Result<DidDocument> {
        let Some(parsed) = Did::parse(did) else {
            tracerr!(Err::InvalidDid, "invalid DID: {did}");
        };
        if parsed.method != METHOD {
            tracerr!(Err::MethodNotSupported, "method not supported: {}", parsed.method);
        }

        let format = self.options.public_key_format;
        if format.is_experimental() && !self.options.enable_experimental_public_key_types {
            tracerr!(Err::InvalidPublicKeyType, "{format} requires experimental key types");
        }

        let (codec, key) = multikey::decode(&parsed.id)?;
        multikey::validate(codec, &key)?;

        let did = parsed.uri;
        let experimental = self.options.enable_experimental_public_key_types;
        let vm = verification_method(&did, &parsed.id, codec, &key, format, experimental)?;
        let vm_id = Kind::String(vm.id.clone());

        let mut document = DidDocument::new(&did);
        if codec == X25519_PUB {
            // X25519 keys cannot sign
            document.relationship_mut(KeyPurpose::KeyAgreement).push(vm_id);
        } else {
            for purpose in [
                KeyPurpose::Authentication,
                KeyPurpose::AssertionMethod,
                KeyPurpose::CapabilityInvocation,
                KeyPurpose::CapabilityDelegation,
            ] {
                document.relationship_mut(purpose).push(vm_id.clone());
            }
        }
        let mut methods = vec![vm];

        if self.options.enable_encryption_key_derivation && codec == ED25519_PUB {
            let derived = to_x25519(&key)?;
            let multibase = multikey::encode(X25519_PUB, &derived)?;
            let vm = verification_method(
                &did,
                &multibase,
                X25519_PUB,
                &derived,
                format,
                experimental,
            )?;
            document.relationship_mut(KeyPurpose::KeyAgreement).push(Kind::String(vm.id.clone()));
            methods.push(vm);
        }

        document.context = contexts_for(methods.iter().map(|vm| vm.type_.as_str()))
            .into_iter()
            .map(Kind::String)
            .collect();
        document.verification_method = Some(methods);

        Ok(document)
    }
}

#[async_trait]
impl MethodResolver for DidKey {
    fn method_name(&self) -> &str {
        METHOD
    }

    async fn resolve(&self, did: &str, _options: &ResolutionOptions) -> DidResolutionResult {
        tracing::debug!("resolving {did}");
        match self.document(did) {
            Ok(document) => document_result(document),
            Err(e) => e.into(),
        }
    }
}

// Build the verification method for a key. An Ed25519 format applied to an X25519 key selects
// `X25519KeyAgreementKey2020` when experimental types are enabled and `JsonWebKey2020`
// otherwise.
fn verification_method(
    did: &str,
    multibase: &str,
    codec: Codec,
    key: &[u8],
    format: PublicKeyFormat,
    experimental: bool,
) -> Result<VerificationMethod> {
    let format = match format {
        PublicKeyFormat::Ed25519VerificationKey2020 if codec == X25519_PUB && experimental => {
            PublicKeyFormat::X25519KeyAgreementKey2020
        }
        PublicKeyFormat::Ed25519VerificationKey2020 if codec == X25519_PUB => {
            PublicKeyFormat::JsonWebKey2020
        }
        f => f,
    };

    let required = match format {
        PublicKeyFormat::Ed25519VerificationKey2020 => Some(ED25519_PUB),
        PublicKeyFormat::X25519KeyAgreementKey2020 => Some(X25519_PUB),
        PublicKeyFormat::EcdsaSecp256k1VerificationKey2019 => Some(SECP256K1_PUB),
        PublicKeyFormat::JsonWebKey2020 | PublicKeyFormat::Multikey => None,
    };
    if required.is_some_and(|c| c != codec) {
        tracerr!(Err::InvalidPublicKeyType, "{format} cannot express a {} key", codec.name);
    }

    let key = match format {
        PublicKeyFormat::JsonWebKey2020 | PublicKeyFormat::EcdsaSecp256k1VerificationKey2019 => {
            KeyFormat::from(multikey::to_jwk(codec, key)?)
        }
        _ => KeyFormat::Multikey {
            public_key_multibase: multibase.to_string(),
        },
    };

    Ok(VerificationMethod {
        context: None,
        id: format!("{did}#{multibase}"),
        type_: format.to_string(),
        controller: did.to_string(),
        key,
    })
}

// Map an Ed25519 public key to its X25519 (Montgomery) form.
fn to_x25519(ed25519: &[u8]) -> Result<[u8; 32]> {
    let Ok(bytes) = <[u8; 32]>::try_from(ed25519) else {
        tracerr!(Err::InvalidPublicKeyLength, "Ed25519 key must be 32 bytes");
    };
    let Some(point) = CompressedEdwardsY(bytes).decompress() else {
        tracerr!(Err::InvalidPublicKey, "Ed25519 key is not a valid curve point");
    };
    Ok(point.to_montgomery().to_bytes())
}
