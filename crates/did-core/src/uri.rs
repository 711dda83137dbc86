//! # DID URI
//!
//! Parsing and serialization of DIDs and DID URLs of the form
//! `did:<method>:<method-specific-id>[;param=value][/path][?query][#fragment]`.
//!
//! See <https://www.w3.org/TR/did-core/#did-syntax>.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Err, Error};

const ID_CHAR: &str = "(?:[a-zA-Z0-9._-]|(?:%[0-9a-fA-F]{2}))";
const METHOD: &str = "([a-z0-9]+)";
const PARAM_CHAR: &str = "[a-zA-Z0-9_.:%-]";

static DID_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let method_id = format!("((?:{ID_CHAR}*:)*(?:{ID_CHAR}+))");
    let params = format!("((?:;{PARAM_CHAR}+={PARAM_CHAR}*)*)");
    let pattern = format!("^did:{METHOD}:{method_id}{params}(/[^#?]*)?(?:\\?([^#]*))?(?:#(.*))?$");
    Regex::new(&pattern).ok()
});

/// A parsed DID or DID URL.
///
/// `uri` always holds the bare DID (`did:<method>:<id>`) while `url` holds the complete input,
/// including any parameters, path, query and fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Did {
    /// The bare DID: `did:<method>:<id>`.
    pub uri: String,

    /// The complete DID URL as supplied.
    pub url: String,

    /// The method name.
    pub method: String,

    /// The method-specific identifier.
    pub id: String,

    /// DID parameters (`;name=value`), in the order supplied.
    pub params: Option<Vec<(String, String)>>,

    /// Path, including the leading `/`.
    pub path: Option<String>,

    /// Raw query string, without the leading `?`.
    pub query: Option<String>,

    /// Fragment, without the leading `#`.
    pub fragment: Option<String>,
}

impl Did {
    /// Parse a DID or DID URL. Returns `None` when the input does not match the DID grammar.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let re = DID_URL.as_ref()?;
        let caps = re.captures(input)?;

        let method = caps.get(1)?.as_str().to_string();
        let id = caps.get(2)?.as_str().to_string();

        let params = caps.get(3).map(|m| m.as_str()).filter(|s| !s.is_empty()).map(|s| {
            s.split(';')
                .filter(|p| !p.is_empty())
                .filter_map(|p| p.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        });

        Some(Self {
            uri: format!("did:{method}:{id}"),
            url: input.to_string(),
            method,
            id,
            params,
            path: caps.get(4).map(|m| m.as_str().to_string()),
            query: caps.get(5).map(|m| m.as_str().to_string()),
            fragment: caps.get(6).map(|m| m.as_str().to_string()),
        })
    }

    /// Query parameters split on `&` then `=`. When a key is repeated, the last value wins.
    #[must_use]
    pub fn query_params(&self) -> HashMap<String, String> {
        let Some(query) = &self.query else {
            return HashMap::new();
        };
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (k.to_string(), v.to_string())
            })
            .collect()
    }

    /// DID parameters as a map. When a name is repeated, the last value wins.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params.clone().unwrap_or_default().into_iter().collect()
    }

    /// True when the input was a bare DID without parameters, path, query or fragment.
    #[must_use]
    pub const fn is_bare(&self) -> bool {
        self.params.is_none()
            && self.path.is_none()
            && self.query.is_none()
            && self.fragment.is_none()
    }
}

impl Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.id)?;
        if let Some(params) = &self.params {
            for (k, v) in params {
                write!(f, ";{k}={v}")?;
            }
        }
        if let Some(path) = &self.path {
            write!(f, "{path}")?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl FromStr for Did {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            tracing::debug!("failed to parse DID: {s}");
            anyhow::Error::from(Err::InvalidDid).context(format!("invalid DID: {s}")).into()
        })
    }
}

impl Serialize for Did {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid DID: {s}")))
    }
}
