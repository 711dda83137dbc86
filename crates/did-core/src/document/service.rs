//! Services are used to express ways of communicating with the DID subject or associated entities.
//! Can be any type of service the DID subject wants to advertise, including decentralized identity
//! management services for further discovery, authentication, authorization, or interaction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{Kind, OneMany};
use crate::error::Err;
use crate::{tracerr, Result};

/// Maximum length of a service type.
pub const MAX_SERVICE_TYPE_LEN: usize = 30;

/// A service endpoint: a URI or a map of named URIs.
pub type Endpoint = Kind<Map<String, Value>>;

/// Service description.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Identifier for the service. Should be unique for services within the DID document.
    pub id: String,

    /// The service type. SHOULD be registered in the DID Specification Registries.
    #[serde(rename = "type")]
    pub type_: String,

    /// One or more endpoints for the service.
    #[allow(clippy::struct_field_names)]
    pub service_endpoint: OneMany<Endpoint>,
}

impl Service {
    /// Create a service with a single URI endpoint.
    #[must_use]
    pub fn new(id: impl Into<String>, type_: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_: type_.into(),
            service_endpoint: OneMany::One(Kind::String(endpoint.into())),
        }
    }

    /// The fragment of the service ID, or the whole ID if it has no fragment.
    #[must_use]
    pub fn local_id(&self) -> &str {
        self.id.rsplit_once('#').map_or(&self.id, |(_, f)| f)
    }
}

/// Check the services in a set conform to format constraints.
///
/// # Errors
///
/// - [`Err::InvalidInput`] if a service ID is duplicated
/// - [`Err::InvalidFormat`] if a service type exceeds the limit of 30 characters
/// - [`Err::InvalidFormat`] if a service endpoint is not a valid URL
pub fn check_services(services: &[Service]) -> Result<()> {
    let mut ids = HashSet::new();
    for s in services {
        if !ids.insert(s.local_id()) {
            tracerr!(Err::InvalidInput, "duplicate service ID: {}", s.id);
        }
        if s.type_.len() > MAX_SERVICE_TYPE_LEN {
            tracerr!(Err::InvalidFormat, "service type exceeds limit of 30: {}", s.type_.len());
        }

        for ep in s.service_endpoint.iter() {
            match ep {
                Kind::String(url) => {
                    url::Url::parse(url)?;
                }
                Kind::Object(map) => {
                    for v in map.values() {
                        if let Value::String(url) = v {
                            url::Url::parse(url)?;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
