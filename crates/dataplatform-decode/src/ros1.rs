//! ROS 1 message decoding
//!
//! Little-endian, unaligned. Strings and dynamic arrays carry a `uint32`
//! length prefix; `time` and `duration` are two 32-bit words.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::cache::SchemaCache;
use crate::decoder::Decoder;
use crate::error::DecodeResult;
use crate::message::{decode_message, read_number, ByteCursor, PrimitiveReader};
use crate::msgdef::{DefinitionSet, Dialect, Primitive};
use crate::types::{Message, Schema};

/// Decoder for the `ros1msg` schema encoding
///
/// Parsed definitions are cached per schema name and text.
#[derive(Debug, Default)]
pub struct Ros1Decoder {
    definitions: SchemaCache<Arc<DefinitionSet>>,
}

impl Ros1Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn definitions_for(&self, schema: &Schema) -> DecodeResult<Arc<DefinitionSet>> {
        self.definitions.get_or_parse(schema, |schema| {
            debug!("Parsing ros1msg definition for {}", schema.name);
            let text = String::from_utf8_lossy(&schema.data);
            Ok(Arc::new(DefinitionSet::parse(&schema.name, &text, Dialect::Ros1)?))
        })
    }
}

impl Decoder for Ros1Decoder {
    fn decode(&self, schema: &Schema, message: &Message) -> DecodeResult<Value> {
        let definitions = self.definitions_for(schema)?;
        let mut reader = Ros1Reader {
            cursor: ByteCursor::new(&message.data, true),
        };
        decode_message(&definitions, &mut reader)
    }
}

struct Ros1Reader<'a> {
    cursor: ByteCursor<'a>,
}

impl PrimitiveReader for Ros1Reader<'_> {
    fn read_primitive(&mut self, primitive: Primitive) -> DecodeResult<Value> {
        match primitive {
            Primitive::String | Primitive::WString => {
                let len = self.cursor.read_u32()? as usize;
                let bytes = self.cursor.take(len)?;
                Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
            }
            Primitive::Time => {
                let sec = self.cursor.read_u32()?;
                let nsec = self.cursor.read_u32()?;
                Ok(json!({ "sec": sec, "nsec": nsec }))
            }
            Primitive::Duration => {
                let sec = self.cursor.read_i32()?;
                let nsec = self.cursor.read_i32()?;
                Ok(json!({ "sec": sec, "nsec": nsec }))
            }
            numeric => read_number(&mut self.cursor, numeric),
        }
    }

    fn read_length(&mut self) -> DecodeResult<usize> {
        Ok(self.cursor.read_u32()? as usize)
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}
