//! # DID ION Registrar
//!
//! Creates long-form `did:ion` DIDs. Verification method keys and the Sidetree recovery and
//! update keys are generated by the key manager, or named by URI when it already holds them;
//! only the public keys leave it.

use std::sync::Arc;

use did_core::error::Err;
use did_core::{
    check_services, tracerr, Algorithm, BearerDid, DidMetadata, Jwk, KeyManager, KeyPurpose,
    PortableDid, Result, Service,
};

use crate::resolve::long_form_document;
use crate::sidetree::{CreateRequest, DocumentState, PublicKeyInput};
use crate::DidIon;

/// A verification method to generate a key for.
#[derive(Clone, Debug, Default)]
pub struct VerificationMethodOptions {
    /// Key algorithm. Ignored when `key_uri` is set.
    pub algorithm: Algorithm,

    /// Use this key held by the key manager instead of generating one.
    pub key_uri: Option<String>,

    /// Verification method ID. Defaults to the JWK thumbprint of the generated key.
    pub id: Option<String>,

    /// Verification relationships. Defaults to `authentication` and `assertionMethod`.
    pub purposes: Vec<KeyPurpose>,
}

/// Options for [`DidIon::create`].
#[derive(Clone, Debug)]
pub struct CreateOptions {
    /// Verification methods to create. A single Ed25519 key is created when empty.
    pub verification_methods: Vec<VerificationMethodOptions>,

    /// Services to include in the document.
    pub services: Vec<Service>,

    /// Submit the create operation to the gateway.
    pub publish: bool,

    /// Use this gateway instead of the configured one when publishing.
    pub gateway_uri: Option<String>,

    /// Recovery key held by the key manager. A secp256k1 key is generated when not set.
    pub recovery_key_uri: Option<String>,

    /// Update key held by the key manager. A secp256k1 key is generated when not set.
    pub update_key_uri: Option<String>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            verification_methods: Vec::new(),
            services: Vec::new(),
            publish: true,
            gateway_uri: None,
            recovery_key_uri: None,
            update_key_uri: None,
        }
    }
}

impl DidIon {
    /// Create a long-form `did:ion` DID, publishing it when [`CreateOptions::publish`] is set.
    ///
    /// A failed publish is logged and leaves the DID unpublished; the DID can still be used in
    /// its long form.
    ///
    /// # Errors
    ///
    /// Returns an error if a key cannot be generated or is not held by the key manager, a
    /// service is invalid or the initial document state is too large.
    pub async fn create(
        &self,
        key_manager: Arc<dyn KeyManager>,
        options: &CreateOptions,
    ) -> Result<BearerDid> {
        let default_method = [VerificationMethodOptions::default()];
        let methods = if options.verification_methods.is_empty() {
            &default_method[..]
        } else {
            &options.verification_methods[..]
        };

        let mut public_keys = Vec::new();
        for method in methods {
            let public_key_jwk =
                public_key(key_manager.as_ref(), method.key_uri.as_deref(), method.algorithm)?;
            let purposes = if method.purposes.is_empty() {
                vec![KeyPurpose::Authentication, KeyPurpose::AssertionMethod]
            } else {
                method.purposes.clone()
            };
            public_keys.push(PublicKeyInput {
                id: method.id.clone(),
                type_: None,
                public_key_jwk,
                purposes,
            });
        }

        let recovery_key = public_key(
            key_manager.as_ref(),
            options.recovery_key_uri.as_deref(),
            Algorithm::Secp256k1,
        )?;
        let update_key = public_key(
            key_manager.as_ref(),
            options.update_key_uri.as_deref(),
            Algorithm::Secp256k1,
        )?;

        let uri = self.compute_long_form_did_uri(
            &recovery_key,
            &update_key,
            &public_keys,
            &options.services,
        )?;
        let (document, document_metadata) = long_form_document(&uri)?;
        tracing::debug!("created {uri}");

        let mut bearer = BearerDid {
            uri,
            document,
            metadata: DidMetadata {
                published: Some(false),
                canonical_id: document_metadata.canonical_id,
                recovery_key: Some(recovery_key),
                update_key: Some(update_key),
            },
            key_manager,
        };

        if options.publish {
            if let Err(e) = self.publish(&mut bearer, options.gateway_uri.as_deref()).await {
                tracing::warn!("failed to publish {}: {e}", bearer.uri);
            }
        }

        Ok(bearer)
    }

    /// The long-form DID for the given keys and services.
    ///
    /// # Errors
    ///
    /// Returns an error if a key or service is invalid or the initial document state is too
    /// large.
    pub fn compute_long_form_did_uri(
        &self,
        recovery_key: &Jwk,
        update_key: &Jwk,
        public_keys: &[PublicKeyInput],
        services: &[Service],
    ) -> Result<String> {
        let request = Self::create_request(recovery_key, update_key, public_keys, services)?;
        request.long_form_did(self.network.as_deref())
    }

    /// The short-form DID for the given keys and services.
    ///
    /// # Errors
    ///
    /// Returns an error if a key or service is invalid or the initial document state is too
    /// large.
    pub fn compute_short_form_did_uri(
        &self,
        recovery_key: &Jwk,
        update_key: &Jwk,
        public_keys: &[PublicKeyInput],
        services: &[Service],
    ) -> Result<String> {
        let request = Self::create_request(recovery_key, update_key, public_keys, services)?;
        request.short_form_did(self.network.as_deref())
    }

    /// Reconstruct a `did:ion` bearer DID from its portable form.
    ///
    /// # Errors
    ///
    /// Returns [`Err::MethodNotSupported`] if the portable DID is not a `did:ion`, otherwise any
    /// error from [`BearerDid::import`].
    pub fn import(portable: PortableDid, key_manager: Arc<dyn KeyManager>) -> Result<BearerDid> {
        if !portable.uri.starts_with("did:ion:") {
            tracerr!(Err::MethodNotSupported, "not a did:ion: {}", portable.uri);
        }
        BearerDid::import(portable, key_manager)
    }

    fn create_request(
        recovery_key: &Jwk,
        update_key: &Jwk,
        public_keys: &[PublicKeyInput],
        services: &[Service],
    ) -> Result<CreateRequest> {
        check_services(services)?;
        let document = DocumentState::new(public_keys, services)?;
        CreateRequest::new(recovery_key, update_key, document)
    }
}

// The public key for `key_uri`, or for a newly generated key.
fn public_key(
    key_manager: &dyn KeyManager,
    key_uri: Option<&str>,
    algorithm: Algorithm,
) -> Result<Jwk> {
    match key_uri {
        Some(key_uri) => key_manager.public_key(key_uri),
        None => key_manager.public_key(&key_manager.generate_key(algorithm)?),
    }
}
