//! # DID Resolver
//!
//! A registry of DID method resolvers. Resolution is dispatched to the method named by the DID,
//! optionally through a [`ResolutionCache`].
//!
//! Two contracts are exposed:
//!
//! * [`DidResolver::try_resolve`] fails when the DID cannot be parsed or no resolver is
//!   registered for its method.
//! * [`DidResolver::resolve`] never fails; errors are reported in `didResolutionMetadata.error`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::{NoOpCache, ResolutionCache};
use crate::document::{Service, VerificationMethod};
use crate::error::{Context as _, Err};
use crate::resolution::{DidResolutionResult, DocumentMetadata};
use crate::uri::Did;
use crate::{tracerr, DidDocument, Result};

/// Options passed to a method resolver.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOptions {
    /// Override the network gateway used by anchored methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_uri: Option<String>,
}

/// Resolution capability implemented by each DID method.
///
/// `resolve` never fails: every error is reported in the returned result.
#[async_trait]
pub trait MethodResolver: Send + Sync {
    /// The method name, e.g. `key` for `did:key`.
    fn method_name(&self) -> &str;

    /// Resolve `did` to a DID document.
    async fn resolve(&self, did: &str, options: &ResolutionOptions) -> DidResolutionResult;
}

/// A resource addressed by a DID URL.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Resource {
    /// The DID document.
    Document(DidDocument),

    /// A verification method selected by fragment.
    VerificationMethod(VerificationMethod),

    /// A service selected by fragment or `service` query parameter.
    Service(Service),
}

/// Resolves DIDs by dispatching to registered method resolvers.
#[derive(Clone)]
pub struct DidResolver {
    methods: HashMap<String, Arc<dyn MethodResolver>>,
    cache: Arc<dyn ResolutionCache>,
    timeout: Option<Duration>,
    options: ResolutionOptions,
}

impl fmt::Debug for DidResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("DidResolver")
            .field("methods", &methods)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DidResolver {
    /// Build a resolver from method resolvers. When two resolvers share a method name, the last
    /// one registered is used.
    #[must_use]
    pub fn new(methods: impl IntoIterator<Item = Arc<dyn MethodResolver>>) -> Self {
        let mut map: HashMap<String, Arc<dyn MethodResolver>> = HashMap::new();
        for method in methods {
            let name = method.method_name().to_string();
            if map.insert(name.clone(), method).is_some() {
                tracing::warn!("resolver for method {name} replaced by later registration");
            }
        }
        Self {
            methods: map,
            cache: Arc::new(NoOpCache),
            timeout: None,
            options: ResolutionOptions::default(),
        }
    }

    /// Use `cache` for resolution results.
    #[must_use]
    pub fn with_cache(mut self, cache: impl ResolutionCache + 'static) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    /// Bound each method resolution by `timeout`. Timed out resolutions are not cached.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Options passed to every method resolver.
    #[must_use]
    pub fn with_options(mut self, options: ResolutionOptions) -> Self {
        self.options = options;
        self
    }

    /// Names of the registered methods, sorted.
    #[must_use]
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The cache in use.
    #[must_use]
    pub fn cache(&self) -> &dyn ResolutionCache {
        self.cache.as_ref()
    }

    /// Resolve `did`, failing if it cannot be parsed or its method is not registered.
    ///
    /// Cached results are returned unmodified. On a miss the method resolver is called and its
    /// result stored.
    ///
    /// # Errors
    ///
    /// * [`Err::InvalidDid`] if `did` is not a valid DID.
    /// * [`Err::MethodNotSupported`] if no resolver is registered for the method.
    /// * Any error returned by the cache.
    pub async fn try_resolve(&self, did: &str) -> Result<DidResolutionResult> {
        let parsed: Did = did.parse()?;
        let Some(method) = self.methods.get(&parsed.method) else {
            tracerr!(Err::MethodNotSupported, "no resolver for {}", parsed.method);
        };

        if let Some(cached) = self.cache.get(did).await? {
            tracing::debug!("resolution cache hit for {did}");
            return Ok(cached);
        }
        tracing::debug!("resolving {did} with {} resolver", parsed.method);

        let resolution = method.resolve(did, &self.options);
        let result = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, resolution).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("resolution of {did} timed out after {timeout:?}");
                    return Ok(DidResolutionResult::error(
                        Err::InternalError,
                        format!("resolution timed out after {timeout:?}"),
                    ));
                }
            },
            None => resolution.await,
        };

        self.cache.set(did, &result).await?;
        Ok(result)
    }

    /// Resolve `did`. Never fails: parse errors, unregistered methods and cache errors are
    /// reported in `didResolutionMetadata.error`.
    pub async fn resolve(&self, did: &str) -> DidResolutionResult {
        match self.try_resolve(did).await {
            Ok(result) => result,
            Err(e) => DidResolutionResult::from(e),
        }
    }

    /// Resolve a DID URL and select the resource it addresses: the document itself, the
    /// verification method named by the fragment, or the service named by the fragment or the
    /// `service` query parameter.
    ///
    /// # Errors
    ///
    /// * [`Err::InvalidDidUrl`] if `did_url` is not a valid DID URL.
    /// * The resolution error code if the DID could not be resolved.
    /// * [`Err::NotFound`] if the addressed resource is not in the document.
    pub async fn dereference(&self, did_url: &str) -> Result<Resource> {
        let Some(url) = Did::parse(did_url) else {
            tracerr!(Err::InvalidDidUrl, "invalid DID URL: {did_url}");
        };

        let result = self.try_resolve(&url.uri).await?;
        if let Some(code) = result.error_code() {
            let message = result.did_resolution_metadata.error_message.unwrap_or_default();
            return Err(code).context(format!("failed to resolve {}: {message}", url.uri));
        }
        let Some(document) = result.did_document else {
            tracerr!(Err::NotFound, "no document for {}", url.uri);
        };

        if let Some(service_id) = url.query_params().get("service") {
            let Some(service) = document.service(service_id) else {
                tracerr!(Err::NotFound, "service {service_id} not found in document");
            };
            return Ok(Resource::Service(service.clone()));
        }
        let Some(fragment) = &url.fragment else {
            return Ok(Resource::Document(document));
        };
        if let Some(vm) = document.verification_method(fragment) {
            return Ok(Resource::VerificationMethod(vm.clone()));
        }
        if let Some(service) = document.service(fragment) {
            return Ok(Resource::Service(service.clone()));
        }
        tracerr!(Err::NotFound, "{did_url} not found in document")
    }
}

/// Convenience for method resolvers: a successful result with default metadata.
#[must_use]
pub fn document_result(document: DidDocument) -> DidResolutionResult {
    DidResolutionResult::document(document, DocumentMetadata::default())
}
