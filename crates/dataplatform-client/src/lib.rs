//! Data Platform Client Library
//!
//! A blocking client for the data platform REST API: devices, events,
//! imports, coverage and topics, plus bulk transfer of recorded log data
//! through pre-signed links and decoding of downloaded MCAP messages.
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use dataplatform_client::{DataPlatformClient, DownloadRequest, EventQuery};
//!
//! fn main() -> anyhow::Result<()> {
//!     let client = DataPlatformClient::new("my-token")?;
//!
//!     let devices = client.get_devices()?;
//!     let events = client.get_events(&EventQuery::for_device_name("rover"))?;
//!
//!     // Raw MCAP bytes for the last hour
//!     let end = Utc::now();
//!     let request = DownloadRequest::new(&devices[0].id, end - Duration::hours(1), end);
//!     let mut progress = |bytes: u64| println!("{} bytes", bytes);
//!     let data = client.download_data(&request, Some(&mut progress))?;
//!
//!     // Decoded messages, loading decoders as encodings show up
//!     for message in client.decode_messages(&data)? {
//!         let message = message?;
//!         println!("{}: {}", message.topic, message.decoded);
//!     }
//!     # let _ = events;
//!     Ok(())
//! }
//! ```
//!
//! # Decoders
//!
//! By default a client constructs the built-in decoder for each schema
//! encoding the first time it meets it. Which built-ins exist depends on the
//! `ros1`, `ros2` and `protobuf` features; `jsonschema` is always available.
//! [`DataPlatformClient::with_decoders`] replaces this with a fixed mapping:
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use dataplatform_client::{DataPlatformClient, Decoder, JsonDecoder};
//!
//! let decoders: HashMap<String, Arc<dyn Decoder>> =
//!     [("jsonschema".to_string(), Arc::new(JsonDecoder) as Arc<dyn Decoder>)].into();
//! let client = DataPlatformClient::new("my-token")?.with_decoders(decoders);
//! # Ok::<(), dataplatform_client::DataPlatformError>(())
//! ```
//!
//! # Testing
//!
//! The `testing` module serves an axum router for integration tests:
//!
//! ```rust,ignore
//! use dataplatform_client::testing::TestServer;
//!
//! let server = TestServer::start(router)?;
//! let devices = server.client()?.get_devices()?;
//! ```

mod client;
mod config;
mod error;
pub mod progress;
pub mod reader;
pub mod registry;
pub mod testing;
mod types;
pub mod wire;

pub use client::{DataPlatformClient, DecodedMessages};
pub use config::{ClientConfig, ClientConfigBuilder, TimeoutsConfig, HOST_ENV, TOKEN_ENV};
pub use error::{DataPlatformError, Result};
pub use progress::{ProgressReader, SizeCallback, UploadSource};
pub use registry::DecoderRegistry;
pub use types::*;

// Re-export decoding types for convenience
pub use dataplatform_decode::{
    DecodeError, Decoder, JsonDecoder, Message, Schema, SchemaEncoding,
};
