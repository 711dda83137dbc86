//! # DID Core
//!
//! Types, traits and functions for working with Decentralized Identifiers (DIDs) and DID
//! Documents: DID URI parsing, the document model, JWK canonicalization, multikey encoding,
//! resolution results, the resolver registry and cache, and the key manager contract used by DID
//! methods.

pub mod bearer;
pub mod cache;
pub mod core;
pub mod document;
pub mod error;
pub mod hashing;
pub mod jwk;
pub mod keys;
pub mod multikey;
pub mod resolution;
pub mod resolver;
pub mod uri;

pub use bearer::{BearerDid, DidMetadata, DidSigner, PortableDid, SignerOptions};
pub use cache::{MemoryCache, NoOpCache, ResolutionCache};
pub use document::{
    check_services, DidDocument, Endpoint, KeyFormat, KeyPurpose, Service, VerificationMethod,
    DID_CONTEXT,
};
pub use jwk::Jwk;
pub use keys::{Algorithm, KeyManager};
pub use resolution::{DidResolutionResult, DocumentMetadata, ResolutionMetadata};
pub use resolver::{DidResolver, MethodResolver, ResolutionOptions, Resource};
pub use uri::Did;

/// Result type for DID Core.
pub type Result<T, E = error::Error> = std::result::Result<T, E>;
