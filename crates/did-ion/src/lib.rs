//! # DID ION
//!
//! Implementation of the Identity Overlay Network (ION) DID method, a Sidetree-based method
//! anchored to the Bitcoin ledger. <https://identity.foundation/ion/>
//!
//! Newly created DIDs are long-form: the initial document state is encoded in the DID itself so
//! it can be resolved before the create operation is anchored. Publishing submits the create
//! operation to a Sidetree gateway, which also resolves anchored (short-form) DIDs.

mod create;
mod publish;
mod resolve;
pub mod sidetree;

pub use crate::create::{CreateOptions, VerificationMethodOptions};
pub use crate::sidetree::{CreateRequest, DocumentState, Patch, PublicKeyInput};

/// The method name.
pub const METHOD: &str = "ion";

/// Gateway used when none is configured.
pub const DEFAULT_GATEWAY_URI: &str = "https://ion.tbd.engineering";

/// Environment variable holding the gateway URI, read by [`DidIon::from_env`].
pub const GATEWAY_ENV: &str = "ION_GATEWAY_URI";

/// The `did:ion` method.
#[derive(Clone, Debug)]
pub struct DidIon {
    http_client: reqwest::Client,
    gateway_uri: String,
    network: Option<String>,
}

impl Default for DidIon {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_URI)
    }
}

impl DidIon {
    /// Create a `did:ion` method using the given Sidetree gateway.
    #[must_use]
    pub fn new(gateway_uri: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            gateway_uri: gateway_uri.into().trim_end_matches('/').to_string(),
            network: None,
        }
    }

    /// Create a `did:ion` method using the gateway named by `ION_GATEWAY_URI`, falling back to
    /// [`DEFAULT_GATEWAY_URI`].
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(GATEWAY_ENV).map_or_else(|_| Self::default(), Self::new)
    }

    /// Set the Sidetree network, e.g. `test`. `mainnet` adds no network segment to DIDs.
    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// The configured gateway.
    #[must_use]
    pub fn gateway_uri(&self) -> &str {
        &self.gateway_uri
    }

    /// The configured network.
    #[must_use]
    pub fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    fn gateway<'a>(&'a self, overridden: Option<&'a str>) -> &'a str {
        overridden.map_or(self.gateway_uri.as_str(), |uri| uri.trim_end_matches('/'))
    }
}
