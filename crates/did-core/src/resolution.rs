//! # DID Resolution
//!
//! The result of resolving a DID, with its resolution and document metadata.
//!
//! See [DID resolution](https://www.w3.org/TR/did-core/#did-resolution).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::context::DID_RESOLUTION_CONTEXT;
use crate::document::DidDocument;
use crate::error::{Err, Error};

/// Content type of a DID document with a JSON-LD context.
pub const DID_LD_JSON: &str = "application/did+ld+json";

/// The result of a DID resolution. Exactly one of `did_document` and
/// `did_resolution_metadata.error` is populated.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidResolutionResult {
    /// Resolution context.
    #[serde(rename = "@context", default = "default_context")]
    pub context: String,

    /// Metadata describing the resolution process.
    #[serde(default)]
    pub did_resolution_metadata: ResolutionMetadata,

    /// The resolved document, or `null` when resolution failed.
    #[serde(default)]
    pub did_document: Option<DidDocument>,

    /// Metadata about the resolved document.
    #[serde(default)]
    pub did_document_metadata: DocumentMetadata,
}

fn default_context() -> String {
    DID_RESOLUTION_CONTEXT.to_string()
}

impl Default for DidResolutionResult {
    fn default() -> Self {
        Self {
            context: default_context(),
            did_resolution_metadata: ResolutionMetadata::default(),
            did_document: None,
            did_document_metadata: DocumentMetadata::default(),
        }
    }
}

impl DidResolutionResult {
    /// A successful result for `document`.
    #[must_use]
    pub fn document(document: DidDocument, metadata: DocumentMetadata) -> Self {
        Self {
            did_resolution_metadata: ResolutionMetadata {
                content_type: Some(DID_LD_JSON.to_string()),
                ..ResolutionMetadata::default()
            },
            did_document: Some(document),
            did_document_metadata: metadata,
            ..Self::default()
        }
    }

    /// A failed result carrying `code`.
    #[must_use]
    pub fn error(code: Err, message: impl Into<Option<String>>) -> Self {
        Self {
            did_resolution_metadata: ResolutionMetadata {
                error: Some(code),
                error_message: message.into(),
                ..ResolutionMetadata::default()
            },
            ..Self::default()
        }
    }

    /// The resolution error code, if resolution failed.
    #[must_use]
    pub const fn error_code(&self) -> Option<Err> {
        self.did_resolution_metadata.error
    }

    /// True when resolution produced a document.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.did_resolution_metadata.error.is_none() && self.did_document.is_some()
    }
}

impl From<Error> for DidResolutionResult {
    fn from(err: Error) -> Self {
        Self::error(err.code(), err.to_string())
    }
}

/// DID resolution metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    /// The error code from the resolution process. Required if there is an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(with = "error_code", default)]
    pub error: Option<Err>,

    /// A human readable description of the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// The media type of the returned representation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// DID document metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Timestamp of the Create operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Timestamp of the last Update operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    /// MUST be set to true if the DID has been deactivated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,

    /// Timestamp of the next Update operation, if the document version is not the latest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_update: Option<DateTime<Utc>>,

    /// Version of the last Update operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// Version of the next Update operation, if the document version is not the latest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_version_id: Option<String>,

    /// Logically equivalent forms of the DID, such as the short form of a long-form DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalent_id: Option<Vec<String>>,

    /// The canonical form of the DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,

    /// Whether the DID has been anchored to its network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,

    /// Method-specific metadata.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

/// Resolution errors are serialized as their registry strings.
mod error_code {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::error::Err;

    const CODES: [Err; 19] = [
        Err::InvalidDid,
        Err::InvalidDidUrl,
        Err::MethodNotSupported,
        Err::NotFound,
        Err::InvalidPublicKey,
        Err::InvalidPublicKeyLength,
        Err::UnsupportedPublicKeyType,
        Err::InvalidPublicKeyType,
        Err::InternalError,
        Err::InvalidHash,
        Err::InvalidFormat,
        Err::InvalidInput,
        Err::KeyNotFound,
        Err::UnsupportedAlgorithm,
        Err::SigningError,
        Err::VerificationFailed,
        Err::SerializationError,
        Err::DeserializationError,
        Err::RequestError,
    ];

    pub fn serialize<S: Serializer>(value: &Option<Err>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(code) => serializer.collect_str(code),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Err>, D::Error> {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        // codes from other implementations are reported as internal errors
        Ok(Some(CODES.into_iter().find(|c| c.to_string() == s).unwrap_or(Err::InternalError)))
    }
}
