//! # DID Engine
//!
//! Creates, encodes and resolves Decentralized Identifiers.
//!
//! The core types live in [`did_core`] and are re-exported here. Methods are enabled with the
//! `key` and `ion` features (both on by default), and [`default_resolver`] builds a resolver
//! registry for every enabled method.
//!
//! ```no_run
//! # async fn run() {
//! let resolver = did_engine::default_resolver();
//! let result = resolver.resolve("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK").await;
//! assert!(result.is_ok());
//! # }
//! ```

use std::sync::Arc;

pub use did_core::*;
#[cfg(feature = "ion")]
pub use did_ion as ion;
#[cfg(feature = "key")]
pub use did_key as key;
pub use keyring;

/// A resolver registry for every enabled method, with no cache and no timeout.
///
/// The `did:ion` resolver uses the gateway named by `ION_GATEWAY_URI`, if set.
#[must_use]
pub fn default_resolver() -> DidResolver {
    let mut methods: Vec<Arc<dyn MethodResolver>> = Vec::new();
    #[cfg(feature = "key")]
    methods.push(Arc::new(did_key::DidKey::default()));
    #[cfg(feature = "ion")]
    methods.push(Arc::new(did_ion::DidIon::from_env()));

    tracing::debug!("default resolver for {} methods", methods.len());
    DidResolver::new(methods)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(all(feature = "ion", feature = "key"))]
    fn default_methods() {
        let resolver = default_resolver();
        assert_eq!(resolver.methods(), ["ion", "key"]);
    }
}
