//! # ION DID Resolver
//!
//! Anchored DIDs are resolved by a Sidetree gateway, which accepts short- or long-form DIDs. A
//! long-form DID can also be resolved locally from the initial state it carries, as is done when
//! a DID is created.

use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use did_core::error::Err;
use did_core::hashing::{self, hash_data, verify_hash};
use did_core::{
    tracerr, Did, DidDocument, DidResolutionResult, DocumentMetadata, MethodResolver,
    ResolutionOptions, Result,
};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;

use crate::sidetree::{self, check_delta, DocumentState, LongFormSegment};
use crate::{DidIon, METHOD};

/// Resolution result as returned by a gateway.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayResolution {
    did_document: Option<DidDocument>,
    #[serde(default)]
    did_document_metadata: DocumentMetadata,
}

impl DidIon {
    /// Resolve a long-form DID from the initial state it carries. No network request is made.
    ///
    /// The suffix and delta hashes, and the size of the delta, are checked before the document is
    /// built. A DID of another method is reported as `methodNotSupported` and a key the document
    /// cannot carry keeps its key error. Any other failure is reported as `invalidDid`.
    #[must_use]
    pub fn resolve_long_form(did: &str) -> DidResolutionResult {
        match long_form_document(did) {
            Ok((document, metadata)) => DidResolutionResult::document(document, metadata),
            Err(e) => {
                let code = match e.code() {
                    code @ (Err::MethodNotSupported
                    | Err::InvalidPublicKey
                    | Err::InvalidPublicKeyType
                    | Err::UnsupportedPublicKeyType) => code,
                    _ => Err::InvalidDid,
                };
                DidResolutionResult::error(code, e.to_string())
            }
        }
    }

    // Fetch the DID from the gateway.
    async fn fetch(&self, gateway_uri: &str, did: &str) -> Result<DidResolutionResult> {
        let url = url::Url::parse(&format!("{gateway_uri}/identifiers/{did}"))?;
        tracing::debug!("resolving {did} at {url}");

        let res = match self.http_client.get(url).header(ACCEPT, "application/json").send().await
        {
            Ok(res) => res,
            Err(e) => tracerr!(Err::InternalError, "failed to call DID resolution endpoint: {e}"),
        };
        if !res.status().is_success() {
            tracing::trace!("gateway returned {} for {did}", res.status());
            return Ok(DidResolutionResult::error(
                Err::NotFound,
                format!("gateway returned {}", res.status()),
            ));
        }

        let resolution = match res.json::<GatewayResolution>().await {
            Ok(resolution) => resolution,
            Err(e) => tracerr!(Err::InternalError, "failed to deserialize resolution: {e}"),
        };
        let Some(document) = resolution.did_document else {
            return Ok(DidResolutionResult::error(Err::NotFound, format!("no document for {did}")));
        };

        let mut metadata = resolution.did_document_metadata;
        let published = metadata
            .additional
            .get("method")
            .and_then(|method| method.get("published"))
            .and_then(Value::as_bool);
        if published.is_some() {
            metadata.published = published;
        }

        Ok(DidResolutionResult::document(document, metadata))
    }
}

#[async_trait]
impl MethodResolver for DidIon {
    fn method_name(&self) -> &str {
        METHOD
    }

    async fn resolve(&self, did: &str, options: &ResolutionOptions) -> DidResolutionResult {
        let Some(parsed) = Did::parse(did) else {
            return DidResolutionResult::error(Err::InvalidDid, format!("invalid DID: {did}"));
        };
        if parsed.method != METHOD {
            return DidResolutionResult::error(
                Err::MethodNotSupported,
                format!("method not supported: {}", parsed.method),
            );
        }

        let gateway_uri = self.gateway(options.gateway_uri.as_deref());
        match self.fetch(gateway_uri, &parsed.uri).await {
            Ok(result) => result,
            Err(e) => e.into(),
        }
    }
}

// Decode, check and apply the initial state of a long-form DID.
pub(crate) fn long_form_document(did: &str) -> Result<(DidDocument, DocumentMetadata)> {
    let Some(parsed) = Did::parse(did) else {
        tracerr!(Err::InvalidDid, "invalid DID: {did}");
    };
    if parsed.method != METHOD {
        tracerr!(Err::MethodNotSupported, "method not supported: {}", parsed.method);
    }
    let Some((short_id, encoded)) = parsed.id.rsplit_once(':') else {
        tracerr!(Err::InvalidDid, "{did} is not a long-form DID");
    };
    let suffix = short_id.rsplit(':').next().unwrap_or(short_id);

    let Ok(bytes) = Base64UrlUnpadded::decode_vec(encoded) else {
        tracerr!(Err::InvalidDid, "long-form segment is not base64url");
    };
    let segment: LongFormSegment = match serde_json::from_slice(&bytes) {
        Ok(segment) => segment,
        Err(e) => tracerr!(Err::InvalidDid, "invalid long-form segment: {e}"),
    };

    check_delta(&segment.delta)?;
    verify_hash(&segment.delta, &segment.suffix_data.delta_hash)?;
    hashing::check(&segment.suffix_data.recovery_commitment)?;
    hashing::check(&segment.delta.update_commitment)?;
    if hash_data(&segment.suffix_data)? != suffix {
        tracerr!(Err::InvalidDid, "DID suffix does not match suffix data");
    }

    let mut state = DocumentState::default();
    state.apply_patches(&segment.delta.patches);
    let document = state.to_document(&parsed.uri);

    let short_form = format!("did:{METHOD}:{short_id}");
    let mut metadata = DocumentMetadata {
        canonical_id: Some(short_form.clone()),
        equivalent_id: Some(vec![short_form]),
        published: Some(false),
        ..DocumentMetadata::default()
    };
    metadata.additional.insert("method".to_string(), sidetree::method_metadata(&segment, false));

    Ok((document, metadata))
}
