//! Error types for message decoding

use thiserror::Error;

/// Errors that can occur while resolving or running a decoder
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No built-in decoder exists for this schema encoding
    #[error("no known decoder for schema encoding {0:?}")]
    Unsupported(String),

    /// The encoding is known but its decoder was compiled out
    #[error("decoder for schema encoding {encoding:?} is unavailable: enable the `{feature}` feature")]
    Unavailable {
        encoding: String,
        feature: &'static str,
    },

    /// Malformed message definition text
    #[error("invalid message definition: {0}")]
    Definition(String),

    /// A field references a type that is not defined in the schema
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// Payload ended before the definition was satisfied
    #[error("data too short: expected {expected} bytes, got {actual}")]
    DataTooShort { expected: usize, actual: usize },

    /// Payload bytes do not fit the definition
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// JSON payload could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protobuf descriptor or payload error
    #[error("protobuf error: {0}")]
    Protobuf(String),
}

/// Result type for decoding operations
pub type DecodeResult<T> = Result<T, DecodeError>;
