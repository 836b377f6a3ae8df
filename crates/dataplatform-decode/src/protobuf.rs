//! Protobuf message decoding via runtime reflection
//!
//! The schema payload is a serialized `FileDescriptorSet` and the schema name
//! is the fully qualified message name.

use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor};
use serde_json::Value;
use tracing::debug;

use crate::cache::SchemaCache;
use crate::decoder::Decoder;
use crate::error::{DecodeError, DecodeResult};
use crate::types::{Message, Schema};

/// Decoder for the `protobuf` schema encoding
#[derive(Debug, Default)]
pub struct ProtobufDecoder {
    descriptors: SchemaCache<MessageDescriptor>,
}

impl ProtobufDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn descriptor_for(&self, schema: &Schema) -> DecodeResult<MessageDescriptor> {
        self.descriptors.get_or_parse(schema, |schema| {
            debug!("Loading protobuf descriptor set for {}", schema.name);
            let pool = DescriptorPool::decode(schema.data.as_slice())
                .map_err(|e| DecodeError::Protobuf(e.to_string()))?;
            pool.get_message_by_name(&schema.name)
                .ok_or_else(|| DecodeError::UnknownType(schema.name.clone()))
        })
    }
}

impl Decoder for ProtobufDecoder {
    fn decode(&self, schema: &Schema, message: &Message) -> DecodeResult<Value> {
        let descriptor = self.descriptor_for(schema)?;
        let dynamic = DynamicMessage::decode(descriptor, message.data.as_slice())
            .map_err(|e| DecodeError::Protobuf(e.to_string()))?;
        Ok(serde_json::to_value(&dynamic)?)
    }
}
