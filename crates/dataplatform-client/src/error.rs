//! Error types for data platform client operations

use dataplatform_decode::DecodeError;
use thiserror::Error;

/// Result type alias for data platform client operations
pub type Result<T> = std::result::Result<T, DataPlatformError>;

/// Errors that can occur during data platform client operations
#[derive(Error, Debug)]
pub enum DataPlatformError {
    /// Caller-side precondition failed; no request was sent
    #[error("{0}")]
    InvalidArgument(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body was not the JSON the endpoint promises
    #[error("{status} Server Error: Unexpected format ({detail})")]
    UnexpectedFormat { status: u16, detail: String },

    /// Server answered with a 4xx/5xx status
    ///
    /// For client errors the message is the server's `error` field when it
    /// sends one, otherwise the status reason phrase.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Explicit decoder mapping has no entry for this encoding
    #[error("no decoder provided for schema encoding {encoding}")]
    NoDecoder { encoding: String },

    /// No built-in decoder exists for this encoding
    #[error("no known decoder class for encoding {encoding}")]
    UnknownEncoding { encoding: String },

    /// Built-in decoder exists but was not compiled in
    #[error("decoder for schema encoding {encoding} is unavailable: enable the `{feature}` feature")]
    DecoderUnavailable {
        encoding: String,
        feature: &'static str,
    },

    /// A decoder failed on a message
    #[error("Failed to decode message: {0}")]
    Decode(#[from] DecodeError),

    /// Downloaded container could not be read
    #[error("Invalid log container: {0}")]
    Container(#[from] mcap::McapError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataPlatformError {
    /// Create an API error from status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::UnexpectedFormat { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
