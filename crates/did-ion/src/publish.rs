//! # DID ION Publishing
//!
//! Submits a create operation to a Sidetree gateway so the DID is anchored and resolvable in its
//! short form.

use did_core::error::Err;
use did_core::{tracerr, BearerDid, Result};

use crate::sidetree::{CreateRequest, DocumentState};
use crate::DidIon;

impl DidIon {
    /// Publish a DID created by [`DidIon::create`]. The create operation is rebuilt from the
    /// document and the recovery and update keys held in the DID's metadata.
    ///
    /// Returns `true` when the gateway accepts the operation, in which case the DID is marked as
    /// published, and `false` when the gateway rejects it.
    ///
    /// # Errors
    ///
    /// * [`Err::InvalidInput`] if the recovery or update key is missing, or the document does not
    ///   produce the DID's canonical ID.
    /// * [`Err::InternalError`] if the gateway cannot be reached.
    pub async fn publish(&self, bearer: &mut BearerDid, gateway_uri: Option<&str>) -> Result<bool> {
        let Some(recovery_key) = &bearer.metadata.recovery_key else {
            tracerr!(Err::InvalidInput, "no recovery key for {}", bearer.uri);
        };
        let Some(update_key) = &bearer.metadata.update_key else {
            tracerr!(Err::InvalidInput, "no update key for {}", bearer.uri);
        };

        let document = DocumentState::from_document(&bearer.document)?;
        let request = CreateRequest::new(recovery_key, update_key, document)?;
        let short_form = request.short_form_did(self.network.as_deref())?;
        if bearer.metadata.canonical_id.as_deref() != Some(short_form.as_str()) {
            tracerr!(Err::InvalidInput, "document does not match {}", bearer.uri);
        }

        let url = format!("{}/operations", self.gateway(gateway_uri));
        tracing::debug!("publishing {short_form} to {url}");

        let res = match self.http_client.post(&url).json(&request).send().await {
            Ok(res) => res,
            Err(e) => tracerr!(Err::InternalError, "failed to call {url}: {e}"),
        };
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            tracing::warn!("gateway rejected create operation for {short_form}: {status} {body}");
            return Ok(false);
        }

        bearer.metadata.published = Some(true);
        Ok(true)
    }
}
