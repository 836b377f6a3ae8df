//! ROS 2 message decoding (CDR)
//!
//! Payloads start with a 4-byte encapsulation header whose second byte
//! selects the byte order. Primitives are aligned to their own width,
//! measured from the end of the header.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::SchemaCache;
use crate::decoder::Decoder;
use crate::error::{DecodeError, DecodeResult};
use crate::message::{decode_message, read_number, ByteCursor, PrimitiveReader};
use crate::msgdef::{DefinitionSet, Dialect, Primitive};
use crate::types::{Message, Schema};

const ENCAPSULATION_HEADER_LEN: usize = 4;

/// Decoder for the `ros2msg` schema encoding
#[derive(Debug, Default)]
pub struct Ros2Decoder {
    definitions: SchemaCache<Arc<DefinitionSet>>,
}

impl Ros2Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn definitions_for(&self, schema: &Schema) -> DecodeResult<Arc<DefinitionSet>> {
        self.definitions.get_or_parse(schema, |schema| {
            debug!("Parsing ros2msg definition for {}", schema.name);
            let text = String::from_utf8_lossy(&schema.data);
            Ok(Arc::new(DefinitionSet::parse(&schema.name, &text, Dialect::Ros2)?))
        })
    }
}

impl Decoder for Ros2Decoder {
    fn decode(&self, schema: &Schema, message: &Message) -> DecodeResult<Value> {
        let definitions = self.definitions_for(schema)?;
        let mut reader = CdrReader::new(&message.data)?;
        decode_message(&definitions, &mut reader)
    }
}

struct CdrReader<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> CdrReader<'a> {
    fn new(data: &'a [u8]) -> DecodeResult<Self> {
        if data.len() < ENCAPSULATION_HEADER_LEN {
            return Err(DecodeError::DataTooShort {
                expected: ENCAPSULATION_HEADER_LEN,
                actual: data.len(),
            });
        }
        // 0x00 0x00 CDR_BE, 0x00 0x01 CDR_LE, 0x00 0x02/0x03 PL_CDR_BE/LE
        let little_endian = data[1] & 0x01 == 0x01;
        Ok(Self {
            cursor: ByteCursor::new(&data[ENCAPSULATION_HEADER_LEN..], little_endian),
        })
    }

    fn align(&mut self, width: usize) -> DecodeResult<()> {
        let misalignment = self.cursor.position() % width;
        if misalignment != 0 {
            self.cursor.skip(width - misalignment)?;
        }
        Ok(())
    }
}

impl PrimitiveReader for CdrReader<'_> {
    fn read_primitive(&mut self, primitive: Primitive) -> DecodeResult<Value> {
        match primitive {
            Primitive::String => {
                self.align(4)?;
                let len = self.cursor.read_u32()? as usize;
                let bytes = self.cursor.take(len)?;
                // Length includes the trailing NUL
                let text = bytes.strip_suffix(&[0]).unwrap_or(bytes);
                Ok(Value::String(String::from_utf8_lossy(text).into_owned()))
            }
            Primitive::WString => {
                self.align(4)?;
                let count = self.cursor.read_u32()? as usize;
                let needed = count.saturating_mul(4);
                if needed > self.cursor.remaining() {
                    return Err(DecodeError::DataTooShort {
                        expected: needed,
                        actual: self.cursor.remaining(),
                    });
                }
                let mut units = Vec::with_capacity(count);
                for _ in 0..count {
                    units.push(self.cursor.read_u32()?);
                }
                if units.last() == Some(&0) {
                    units.pop();
                }
                Ok(Value::String(wide_to_string(&units)))
            }
            Primitive::Time | Primitive::Duration => Err(DecodeError::InvalidData(
                "time and duration are not ROS 2 primitives".to_string(),
            )),
            numeric => {
                if let Some(width) = numeric.byte_size() {
                    self.align(width)?;
                }
                read_number(&mut self.cursor, numeric)
            }
        }
    }

    fn read_length(&mut self) -> DecodeResult<usize> {
        self.align(4)?;
        Ok(self.cursor.read_u32()? as usize)
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

/// Each 32-bit unit holds either a UTF-16 code unit or a full code point
fn wide_to_string(units: &[u32]) -> String {
    if units.iter().all(|&unit| unit <= 0xFFFF) {
        char::decode_utf16(units.iter().map(|&unit| unit as u16))
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    } else {
        units
            .iter()
            .map(|&unit| char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}
