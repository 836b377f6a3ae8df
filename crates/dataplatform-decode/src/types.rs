//! Schema and message records handed to decoders

use serde::{Deserialize, Serialize};

/// A schema record read from a log container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Container-local schema id
    pub id: u16,
    /// Type name, e.g. `sensor_msgs/Imu` or `foxglove.Log`
    pub name: String,
    /// Schema encoding tag, e.g. `ros1msg`
    pub encoding: String,
    /// Raw schema payload (definition text, descriptor set, JSON schema)
    pub data: Vec<u8>,
}

/// A single raw message record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub channel_id: u16,
    pub sequence: u32,
    /// Nanoseconds since epoch at which the message was recorded
    pub log_time: u64,
    /// Nanoseconds since epoch at which the message was published
    pub publish_time: u64,
    /// Serialized payload
    pub data: Vec<u8>,
}

/// Schema encodings with a built-in decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaEncoding {
    /// ROS 1 message definitions, ROS 1 serialization
    Ros1Msg,
    /// ROS 2 message definitions, CDR serialization
    Ros2Msg,
    /// Protobuf `FileDescriptorSet`
    Protobuf,
    /// JSON Schema, JSON payloads
    JsonSchema,
}

impl SchemaEncoding {
    /// All encodings, in tag order
    pub const ALL: [SchemaEncoding; 4] = [
        SchemaEncoding::Ros1Msg,
        SchemaEncoding::Ros2Msg,
        SchemaEncoding::Protobuf,
        SchemaEncoding::JsonSchema,
    ];

    /// Look up an encoding by its tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == tag)
    }

    /// Wire tag of this encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaEncoding::Ros1Msg => "ros1msg",
            SchemaEncoding::Ros2Msg => "ros2msg",
            SchemaEncoding::Protobuf => "protobuf",
            SchemaEncoding::JsonSchema => "jsonschema",
        }
    }

    /// Cargo feature that provides the decoder
    pub fn feature(&self) -> &'static str {
        match self {
            SchemaEncoding::Ros1Msg => "ros1",
            SchemaEncoding::Ros2Msg => "ros2",
            SchemaEncoding::Protobuf => "protobuf",
            SchemaEncoding::JsonSchema => "json",
        }
    }

    /// Whether the decoder for this encoding was compiled in
    pub fn is_available(&self) -> bool {
        match self {
            SchemaEncoding::Ros1Msg => cfg!(feature = "ros1"),
            SchemaEncoding::Ros2Msg => cfg!(feature = "ros2"),
            SchemaEncoding::Protobuf => cfg!(feature = "protobuf"),
            SchemaEncoding::JsonSchema => true,
        }
    }
}

impl std::fmt::Display for SchemaEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
