//! Request and response types for the data platform client

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dataplatform_decode::{Message, Schema};
use serde::{Deserialize, Serialize};

use crate::wire;

// =============================================================================
// Device Types
// =============================================================================

/// A registered device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub serial_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Device returned by `create_device`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub id: String,
    pub name: String,
    pub serial_number: String,
}

// =============================================================================
// Event Types
// =============================================================================

/// A device event
///
/// `timestamp` is derived from `timestamp_nanos` with microsecond precision;
/// see [`wire::timestamp_from_nanos`]. Serializes in the platform's camelCase
/// shape, without the derived `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventWire", into = "EventWire")]
pub struct Event {
    pub id: String,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub timestamp_nanos: i64,
    pub duration_nanos: i64,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventWire {
    id: String,
    device_id: String,
    #[serde(deserialize_with = "wire::nanos")]
    timestamp_nanos: i64,
    #[serde(deserialize_with = "wire::nanos")]
    duration_nanos: i64,
    #[serde(default)]
    metadata: HashMap<String, String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventWire> for Event {
    fn from(wire: EventWire) -> Self {
        Self {
            id: wire.id,
            device_id: wire.device_id,
            timestamp: wire::timestamp_from_nanos(wire.timestamp_nanos),
            timestamp_nanos: wire.timestamp_nanos,
            duration_nanos: wire.duration_nanos,
            metadata: wire.metadata,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

impl From<Event> for EventWire {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            device_id: event.device_id,
            timestamp_nanos: event.timestamp_nanos,
            duration_nanos: event.duration_nanos,
            metadata: event.metadata,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Sort direction for event listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters for `get_events`; one of `device_id` or `device_name` is required
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    /// snake_case field name, sent camelCased
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Only events whose metadata has `key` = `value`
    pub key: Option<String>,
    pub value: Option<String>,
}

impl EventQuery {
    pub fn for_device_id(device_id: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            ..Default::default()
        }
    }

    pub fn for_device_name(device_name: impl Into<String>) -> Self {
        Self {
            device_name: Some(device_name.into()),
            ..Default::default()
        }
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    pub fn page(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self.value = Some(value.into());
        self
    }
}

// =============================================================================
// Data Types
// =============================================================================

/// Container format of downloaded data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// ROS 1 bag
    #[serde(rename = "bag1")]
    Bag,
    /// MCAP
    #[default]
    #[serde(rename = "mcap0")]
    Mcap,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Bag => "bag1",
            OutputFormat::Mcap => "mcap0",
        }
    }

    /// File extension the platform uses to infer an uploaded file's format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Bag => "bag",
            OutputFormat::Mcap => "mcap",
        }
    }
}

/// Parameters for `download_data`
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub device_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Empty means every topic
    pub topics: Vec<String>,
    pub output_format: OutputFormat,
}

impl DownloadRequest {
    pub fn new(device_id: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            device_id: device_id.into(),
            start,
            end,
            topics: Vec::new(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// A time interval with recorded data for a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRange {
    pub device_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// An imported file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    pub import_id: String,
    pub device_id: String,
    pub import_time: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub input_type: String,
    pub output_type: String,
    pub filename: String,
    pub input_size: u64,
    pub total_output_size: u64,
}

/// Filters for `get_imports`
#[derive(Debug, Clone, Default)]
pub struct ImportQuery {
    pub device_id: Option<String>,
    /// Import time bounds
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Data time bounds
    pub data_start: Option<DateTime<Utc>>,
    pub data_end: Option<DateTime<Utc>>,
    pub include_deleted: bool,
    pub filename: Option<String>,
}

impl ImportQuery {
    pub fn for_device(device_id: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            ..Default::default()
        }
    }
}

/// A topic recorded for a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub topic: String,
    #[serde(deserialize_with = "wire::string_or_number")]
    pub version: String,
    pub encoding: String,
    pub schema_encoding: String,
    pub schema_name: String,
}

/// Outcome of the direct upload to the pre-signed link
///
/// Returned as-is whatever the status; callers inspect `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub link: String,
    pub text: String,
    pub code: u16,
}

/// A decoded message from `get_messages`
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    pub topic: String,
    pub schema: Arc<Schema>,
    pub message: Message,
    pub decoded: serde_json::Value,
}

// =============================================================================
// Internal wire bodies
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct LinkResponse {
    pub link: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StreamRequest<'a> {
    pub device_id: &'a str,
    pub start: String,
    pub end: String,
    pub output_format: OutputFormat,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub topics: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadRequest<'a> {
    pub device_id: &'a str,
    pub filename: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateEventRequest<'a> {
    pub device_id: &'a str,
    pub duration_nanos: String,
    pub metadata: &'a HashMap<String, String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateDeviceRequest<'a> {
    pub name: &'a str,
    pub serial_number: &'a str,
}
