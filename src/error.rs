//! Error types for bsky-fetch
//!
//! Fetch operations never surface these to callers: transport and payload
//! failures are downgraded to empty results at the gateway boundary. The error
//! type exists for fallible construction (clients, gateways, config) and for the
//! inspectable paths (`Gateway::fetch`, batch reports) that record why a request
//! produced nothing.

use thiserror::Error;

/// Result type alias for bsky-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bsky-fetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "limits.profile_chunk_size")
        key: Option<String>,
    },

    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Fully-qualified request URL
        url: String,
        /// Response body text (truncated)
        body: String,
    },

    /// Response body was not valid JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Base URL or endpoint could not be parsed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A JSON object could not be mapped into an entity
    #[error("cannot map {entity}: {message}")]
    Mapping {
        /// Entity kind being mapped ("profile", "post", "thread", ...)
        entity: &'static str,
        /// What was wrong with the payload
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Shorthand for a mapping error
    pub(crate) fn mapping(entity: &'static str, message: impl Into<String>) -> Self {
        Error::Mapping {
            entity,
            message: message.into(),
        }
    }

    /// Machine-readable error code, used in batch reports and log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Network(e) if e.is_timeout() => "timeout",
            Error::Network(_) => "network_error",
            Error::Http { .. } => "http_error",
            Error::Serialization(_) => "serialization_error",
            Error::Url(_) => "invalid_url",
            Error::Mapping { .. } => "mapping_error",
            Error::Io(_) => "io_error",
        }
    }
}
