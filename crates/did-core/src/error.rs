//! # DID Core Errors
//!
//! This module defines the error types used by the DID engine, including for traits that may be
//! implemented in other crates. Error codes render as the DID registry error strings so they can
//! be placed directly into `didResolutionMetadata.error`.

use std::fmt::Display;

use thiserror::Error;

/// Log an error with tracing and return it with context.
///
/// # Example
/// ```
/// use did_core::error::Err;
/// use did_core::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::InvalidInput, "message: {}", "some message")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::InvalidInput)
/// }
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        use $crate::error::Context as _;
        tracing::error!($($msg)*);
        return Err($code).context(format!($($msg)*));
        }
    };
    // no context
    ($code:expr) => {
        {
        tracing::error!("{}", $code);
        return Err($code.into());
        }
    }
}

/// Public error type for the DID engine.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// Render the error as a resolution-style JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code().to_string(),
            "errorMessage": self.to_string(),
        })
    }

    /// Returns true if `err` is the code held by this error object.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.0.downcast_ref::<Err>().is_some_and(|e| e == &err)
    }

    /// The typed code for this error. Errors raised by third-party libraries without a code are
    /// reported as [`Err::InternalError`].
    #[must_use]
    pub fn code(&self) -> Err {
        self.0.downcast_ref::<Err>().copied().unwrap_or(Err::InternalError)
    }
}

/// Typed errors for the DID engine.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq, Hash)]
pub enum Err {
    /// The DID supplied does not conform to the DID syntax.
    #[error("invalidDid")]
    InvalidDid,

    /// The DID URL supplied does not conform to the DID URL syntax.
    #[error("invalidDidUrl")]
    InvalidDidUrl,

    /// The DID method is not supported by the resolver or method.
    #[error("methodNotSupported")]
    MethodNotSupported,

    /// No DID document was found for the requested DID.
    #[error("notFound")]
    NotFound,

    /// The public key bytes are not a valid point or encoding for the key type.
    #[error("invalidPublicKey")]
    InvalidPublicKey,

    /// The decoded public key does not have the length fixed by its multicodec.
    #[error("invalidPublicKeyLength")]
    InvalidPublicKeyLength,

    /// The public key type or format is unknown.
    #[error("unsupportedPublicKeyType")]
    UnsupportedPublicKeyType,

    /// The public key format is known but experimental and has not been enabled.
    #[error("invalidPublicKeyType")]
    InvalidPublicKeyType,

    /// An unexpected error occurred (see context for information).
    #[error("internalError")]
    InternalError,

    /// Hash is not a valid SHA-256 multihash or does not match the hashed content.
    #[error("invalidHash")]
    InvalidHash,

    /// Invalid format. (See context for details)
    #[error("invalidFormat")]
    InvalidFormat,

    /// Invalid input. Used where a verification fails that is more complex than a simple incorrect
    /// format. (See context for details)
    #[error("invalidInput")]
    InvalidInput,

    /// Key not found. Returned when a key manager does not hold the requested key or a document
    /// has no key for the requested purpose.
    #[error("keyNotFound")]
    KeyNotFound,

    /// A requested key algorithm is not supported by the key manager.
    #[error("unsupportedAlgorithm")]
    UnsupportedAlgorithm,

    /// Failure to sign a message.
    #[error("signingError")]
    SigningError,

    /// Failure to verify a signature.
    #[error("verificationFailed")]
    VerificationFailed,

    /// An error occurred trying to serialize data.
    #[error("serializationError")]
    SerializationError,

    /// An error occurred trying to deserialize data.
    #[error("deserializationError")]
    DeserializationError,

    /// A request to a downstream service failed to connect or get a response.
    #[error("requestError")]
    RequestError,
}

/// Context is used to decorate errors with useful context information.
pub trait Context<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Adds context to the error.
    ///
    /// # Errors
    ///
    /// * Original error with context appended.
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(Error(anyhow::Error::from(e).context(context))),
        }
    }
}

impl From<Err> for Error {
    fn from(error: Err) -> Self {
        Self(error.into())
    }
}

impl From<base64ct::Error> for Error {
    fn from(err: base64ct::Error) -> Self {
        Self(anyhow::Error::from(err).context(Err::InvalidFormat))
    }
}

impl From<multihash::Error> for Error {
    fn from(err: multihash::Error) -> Self {
        Self(anyhow::Error::from(err).context(Err::InvalidHash))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self(err.into())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self(anyhow::Error::from(err).context(Err::InvalidFormat))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    use super::*;
    use crate::Result;

    #[test]
    fn base_err() {
        let err: Error = Err::InvalidDid.into();

        assert_eq!(err.to_json(), json!({"error":"invalidDid","errorMessage":"invalidDid"}));
        assert!(err.is(Err::InvalidDid));
        assert_eq!(err.code(), Err::InvalidDid);
    }

    #[test]
    fn context_err() {
        let res: Result<()> = Err(Err::NotFound).context("no document for did:ion:abc");
        let err = res.expect_err("expected error");

        assert_eq!(
            err.to_json(),
            json!({"error":"notFound","errorMessage":"no document for did:ion:abc"})
        );
    }

    #[test]
    fn library_err_has_code() {
        let err: Error = url::Url::parse("not a url").expect_err("should fail").into();
        assert_eq!(err.code(), Err::InvalidFormat);

        let err: Error = anyhow::anyhow!("unexpected").into();
        assert_eq!(err.code(), Err::InternalError);
    }

    #[test]
    fn test_macro() {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let Err(e) = run_macro() else {
            panic!("expected error");
        };

        assert_eq!(e.to_string(), "test me");
        assert!(e.is(Err::InvalidFormat));
    }

    fn run_macro() -> Result<()> {
        tracerr!(Err::InvalidFormat, "test {}", "me")
    }
}
