//! Data platform HTTP client implementation

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use dataplatform_decode::Decoder;
use reqwest::blocking::{Body, Client, Response};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{DataPlatformError, Result};
use crate::progress::{ProgressReader, SizeCallback, UploadSource};
use crate::reader::RecordReader;
use crate::registry::DecoderRegistry;
use crate::types::*;
use crate::wire::{self, QueryParams};

/// Read size for streamed downloads
const DOWNLOAD_CHUNK_SIZE: usize = 32 * 1024;

/// Upper bound on the buffer reserved from a server-announced length
const DOWNLOAD_PREALLOC_LIMIT: usize = 64 * 1024 * 1024;

/// Data platform REST API client
///
/// Every method blocks until its round trip completes. The client holds no
/// open resources between calls beyond the transport's connection pool.
///
/// The session's decoder cache is internally locked, so a client may be
/// shared between threads.
#[derive(Debug)]
pub struct DataPlatformClient {
    /// Carries the bearer token and JSON content type
    api: Client,
    /// Bare client for pre-signed links, which carry their own authorization
    transfer: Client,
    base_url: Url,
    decoders: DecoderRegistry,
}

impl DataPlatformClient {
    /// Create a client for the default host
    pub fn new(token: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(token))
    }

    /// Create a client for a specific API host
    pub fn with_host(token: &str, host: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::builder(token).host(host).build())
    }

    /// Create a client from configuration
    ///
    /// Decoders are loaded on demand; see [`DataPlatformClient::with_decoders`]
    /// to supply a fixed set instead.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| DataPlatformError::InvalidArgument(format!("Invalid token: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let api = Self::builder(config).default_headers(headers).build()?;
        let transfer = Self::builder(config).build()?;
        let base_url = Url::parse(&config.api_base())?;

        Ok(Self {
            api,
            transfer,
            base_url,
            decoders: DecoderRegistry::auto_load(),
        })
    }

    fn builder(config: &ClientConfig) -> reqwest::blocking::ClientBuilder {
        let builder = Client::builder().timeout(config.timeouts.request());
        match config.timeouts.connect() {
            Some(timeout) => builder.connect_timeout(timeout),
            None => builder,
        }
    }

    /// Only decode the given encodings, disabling decoder auto-loading
    pub fn with_decoders(mut self, decoders: HashMap<String, Arc<dyn Decoder>>) -> Self {
        self.decoders = DecoderRegistry::fixed(decoders);
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Decoder registry for this session
    pub fn decoders(&self) -> &DecoderRegistry {
        &self.decoders
    }

    // =========================================================================
    // Event Operations
    // =========================================================================

    /// Create an event
    ///
    /// `duration_nanos` is zero for an instantaneous event.
    #[instrument(skip(self, metadata))]
    pub fn create_event(
        &self,
        device_id: &str,
        time: DateTime<Utc>,
        duration_nanos: u64,
        metadata: &HashMap<String, String>,
    ) -> Result<Event> {
        let url = self.url("/beta/device-events")?;
        let body = CreateEventRequest {
            device_id,
            duration_nanos: duration_nanos.to_string(),
            metadata,
            timestamp: wire::format_time(&time),
        };

        let response = self.api.post(url).json(&body).send()?;
        self.handle_response(response)
    }

    /// Delete an event
    #[instrument(skip(self))]
    pub fn delete_event(&self, event_id: &str) -> Result<()> {
        let url = self.resource_url("/beta/device-events", event_id)?;
        let response = self.api.delete(url).send()?;
        self.handle_response::<Value>(response)?;
        Ok(())
    }

    /// List events for a device
    ///
    /// Fails without a request when neither `device_id` nor `device_name` is
    /// set.
    #[instrument(skip(self))]
    pub fn get_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let has_id = query.device_id.as_deref().is_some_and(|s| !s.is_empty());
        let has_name = query.device_name.as_deref().is_some_and(|s| !s.is_empty());
        if !has_id && !has_name {
            return Err(DataPlatformError::InvalidArgument(
                "One of device_id or device_name is required.".to_string(),
            ));
        }

        let sort_by = query.sort_by.as_deref().map(wire::camelize);
        let params = QueryParams::new()
            .text("deviceId", query.device_id.as_deref())
            .text("deviceName", query.device_name.as_deref())
            .text("sortBy", sort_by.as_deref())
            .text("sortOrder", query.sort_order.as_ref().map(SortOrder::as_str))
            .number("limit", query.limit)
            .number("offset", query.offset)
            .time("start", query.start.as_ref())
            .time("end", query.end.as_ref())
            .text("key", query.key.as_deref())
            .text("value", query.value.as_deref());

        self.get_json("/beta/device-events", &params)
    }

    // =========================================================================
    // Data Operations
    // =========================================================================

    /// Download a time range of device data and decode every message
    ///
    /// Messages are returned in container order. Fails on the first message
    /// whose schema encoding has no decoder.
    #[instrument(skip(self))]
    pub fn get_messages(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        topics: &[String],
    ) -> Result<Vec<DecodedMessage>> {
        let request = DownloadRequest::new(device_id, start, end).topics(topics.iter().cloned());
        let data = self.download_data(&request, None)?;
        let messages = self.decode_messages(&data)?.collect();
        messages
    }

    /// Decode the messages of an already downloaded MCAP container
    pub fn decode_messages<'a>(&'a self, data: &'a [u8]) -> Result<DecodedMessages<'a>> {
        Ok(DecodedMessages {
            records: RecordReader::new(data)?,
            decoders: &self.decoders,
        })
    }

    /// Download raw device data
    ///
    /// Requests a pre-signed link, then streams its body into memory.
    /// `progress` receives the cumulative byte count after every chunk.
    #[instrument(skip(self, progress))]
    pub fn download_data(
        &self,
        request: &DownloadRequest,
        mut progress: Option<&mut dyn FnMut(u64)>,
    ) -> Result<Bytes> {
        let url = self.url("/v1/data/stream")?;
        let body = StreamRequest {
            device_id: &request.device_id,
            start: wire::format_time(&request.start),
            end: wire::format_time(&request.end),
            output_format: request.output_format,
            topics: &request.topics,
        };

        let response = self.api.post(url).json(&body).send()?;
        let LinkResponse { link } = self.handle_response(response)?;

        debug!("Streaming download from pre-signed link");
        let mut response = self.transfer.get(&link).send()?.error_for_status()?;

        let mut data = BytesMut::with_capacity(initial_capacity(response.content_length()));
        let mut chunk = vec![0u8; DOWNLOAD_CHUNK_SIZE];
        loop {
            let n = response.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
            if let Some(callback) = progress.as_deref_mut() {
                callback(data.len() as u64);
            }
        }

        info!(bytes = data.len(), "Download complete");
        Ok(data.freeze())
    }

    /// List time ranges with recorded data
    ///
    /// `tolerance` is the minimum gap in seconds separating two ranges.
    #[instrument(skip(self))]
    pub fn get_coverage(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        device_id: Option<&str>,
        tolerance: Option<u64>,
    ) -> Result<Vec<CoverageRange>> {
        let params = QueryParams::new()
            .text("deviceId", device_id)
            .number("tolerance", tolerance)
            .time("start", Some(&start))
            .time("end", Some(&end));

        self.get_json("/v1/data/coverage", &params)
    }

    /// List topics recorded for a device in a time range
    #[instrument(skip(self))]
    pub fn get_topics(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Topic>> {
        let params = QueryParams::new()
            .set("deviceId", device_id)
            .time("start", Some(&start))
            .time("end", Some(&end))
            .set("includeSchemas", wire::bool_param(false));

        self.get_json("/v1/data/topics", &params)
    }

    /// Upload a `.bag` or `.mcap` file
    ///
    /// The platform infers the format from the extension of `filename`.
    ///
    /// The upload itself does not fail on an error status: the result carries
    /// the status code and response text for the caller to inspect.
    #[instrument(skip(self, data, callback))]
    pub fn upload_data(
        &self,
        device_id: &str,
        filename: &str,
        data: impl Into<UploadSource>,
        callback: Option<SizeCallback>,
    ) -> Result<UploadResult> {
        let url = self.url("/v1/data/upload")?;
        let body = UploadRequest {
            device_id,
            filename,
        };

        let response = self.api.post(url).json(&body).send()?;
        let LinkResponse { link } = self.handle_response(response)?;

        let reader = ProgressReader::new(data.into(), callback)?;
        let length = reader.len();
        debug!(bytes = length, "Uploading to pre-signed link");

        let response = self
            .transfer
            .put(&link)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::sized(reader, length))
            .send()?;

        let code = response.status().as_u16();
        let text = response.text()?;
        info!(code, bytes = length, "Upload finished");

        Ok(UploadResult { link, text, code })
    }

    // =========================================================================
    // Import Operations
    // =========================================================================

    /// Delete an import
    #[instrument(skip(self))]
    pub fn delete_import(&self, device_id: &str, import_id: &str) -> Result<()> {
        let url = self.resource_url("/v1/data/imports", import_id)?;
        let response = self
            .api
            .delete(url)
            .query(&[("deviceId", device_id)])
            .send()?;
        self.handle_response::<Value>(response)?;
        Ok(())
    }

    /// List imports
    #[instrument(skip(self))]
    pub fn get_imports(&self, query: &ImportQuery) -> Result<Vec<Import>> {
        let params = QueryParams::new()
            .text("deviceId", query.device_id.as_deref())
            .time("start", query.start.as_ref())
            .time("end", query.end.as_ref())
            .time("dataStart", query.data_start.as_ref())
            .time("dataEnd", query.data_end.as_ref())
            .flag("includeDeleted", query.include_deleted)
            .text("filename", query.filename.as_deref());

        self.get_json("/v1/data/imports", &params)
    }

    // =========================================================================
    // Device Operations
    // =========================================================================

    /// Get a single device
    #[instrument(skip(self))]
    pub fn get_device(&self, device_id: &str) -> Result<Device> {
        let url = self.resource_url("/v1/devices", device_id)?;
        debug!("Getting device from {}", url);

        let response = self.api.get(url).send()?;
        self.handle_response(response)
    }

    /// List all devices
    #[instrument(skip(self))]
    pub fn get_devices(&self) -> Result<Vec<Device>> {
        self.get_json("/v1/devices", &QueryParams::new())
    }

    /// Register a device
    #[instrument(skip(self))]
    pub fn create_device(&self, name: &str, serial_number: &str) -> Result<NewDevice> {
        let url = self.url("/v1/devices")?;
        let body = CreateDeviceRequest {
            name,
            serial_number,
        };

        let response = self.api.post(url).json(&body).send()?;
        self.handle_response(response)
    }

    /// Delete a device
    ///
    /// The device's imports must be deleted first; see
    /// [`DataPlatformClient::delete_import`].
    #[instrument(skip(self))]
    pub fn delete_device(&self, device_id: &str) -> Result<()> {
        let url = self.resource_url("/v1/devices", device_id)?;
        let response = self.api.delete(url).send()?;
        self.handle_response::<Value>(response)?;
        Ok(())
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// `collection/{id}` with `id` percent-encoded as one path segment
    fn resource_url(&self, collection: &str, id: &str) -> Result<Url> {
        let mut url = self.url(collection)?;
        url.path_segments_mut()
            .map_err(|_| {
                DataPlatformError::InvalidArgument("Base URL cannot carry a path".to_string())
            })?
            .push(id);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, params: &QueryParams) -> Result<T> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let response = self.api.get(url).query(params.pairs()).send()?;
        self.handle_response(response)
    }

    /// Unwrap the JSON body and deserialize it
    fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes()?;
        let json = wire::json_or_error(status, &body)?;

        serde_json::from_value(json).map_err(|e| DataPlatformError::UnexpectedFormat {
            status: status.as_u16(),
            detail: e.to_string(),
        })
    }
}

/// Iterator over decoded container messages, in container order
///
/// Yields an error for a record whose schema encoding cannot be resolved or
/// decoded; iteration may continue past it.
pub struct DecodedMessages<'a> {
    records: RecordReader<'a>,
    decoders: &'a DecoderRegistry,
}

impl Iterator for DecodedMessages<'_> {
    type Item = Result<DecodedMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };

        let decoded = self
            .decoders
            .resolve(&record.schema.encoding)
            .and_then(|decoder| {
                decoder
                    .decode(&record.schema, &record.message)
                    .map_err(DataPlatformError::from)
            });

        Some(decoded.map(|decoded| DecodedMessage {
            topic: record.channel.topic.clone(),
            schema: record.schema,
            message: record.message,
            decoded,
        }))
    }
}

impl std::fmt::Debug for DecodedMessages<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedMessages")
            .field("records", &self.records)
            .field("decoders", self.decoders)
            .finish()
    }
}

/// Buffer reservation for a body of `content_length` bytes
fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length
        .map(|len| usize::try_from(len).unwrap_or(usize::MAX))
        .unwrap_or(0)
        .min(DOWNLOAD_PREALLOC_LIMIT)
}
