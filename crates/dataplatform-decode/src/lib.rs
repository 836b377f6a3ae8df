//! dataplatform-decode - decoders for schema-encoded log messages
//!
//! Log containers store each message next to a schema whose `encoding` tag
//! names the serialization format. This crate turns such a message into a
//! [`serde_json::Value`].
//!
//! | Tag | Decoder | Feature |
//! |-----|---------|---------|
//! | `ros1msg` | [`Ros1Decoder`] | `ros1` (default) |
//! | `ros2msg` | [`Ros2Decoder`] | `ros2` (default) |
//! | `protobuf` | `ProtobufDecoder` | `protobuf` |
//! | `jsonschema` | [`JsonDecoder`] | always |
//!
//! # Quick Start
//!
//! ```rust
//! use dataplatform_decode::{builtin_decoder, Message, Schema};
//! use serde_json::json;
//!
//! let decoder = builtin_decoder("jsonschema").unwrap();
//!
//! let schema = Schema {
//!     id: 1,
//!     name: "Reading".to_string(),
//!     encoding: "jsonschema".to_string(),
//!     data: Vec::new(),
//! };
//! let message = Message {
//!     channel_id: 1,
//!     sequence: 0,
//!     log_time: 0,
//!     publish_time: 0,
//!     data: br#"{"celsius": 21.5}"#.to_vec(),
//! };
//!
//! assert_eq!(decoder.decode(&schema, &message).unwrap(), json!({"celsius": 21.5}));
//! ```

pub mod decoder;
pub mod error;
pub mod types;

#[cfg(any(feature = "ros1", feature = "ros2", feature = "protobuf"))]
mod cache;
#[cfg(any(feature = "ros1", feature = "ros2"))]
mod message;
#[cfg(any(feature = "ros1", feature = "ros2"))]
pub mod msgdef;

#[cfg(feature = "ros2")]
pub mod cdr;
#[cfg(feature = "protobuf")]
pub mod protobuf;
#[cfg(feature = "ros1")]
pub mod ros1;

pub use decoder::{builtin_decoder, Decoder, JsonDecoder};
pub use error::{DecodeError, DecodeResult};
pub use types::{Message, Schema, SchemaEncoding};

#[cfg(feature = "ros2")]
pub use cdr::Ros2Decoder;
#[cfg(feature = "protobuf")]
pub use protobuf::ProtobufDecoder;
#[cfg(feature = "ros1")]
pub use ros1::Ros1Decoder;
