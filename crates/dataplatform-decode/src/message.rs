//! Walks a parsed definition over serialized bytes
//!
//! The ROS 1 and CDR decoders differ only in how primitives and lengths are
//! laid out; the structure of the walk is shared.

use serde_json::{json, Map, Value};

use crate::error::{DecodeError, DecodeResult};
use crate::msgdef::{Arity, DefinitionSet, Field, FieldKind, Primitive};

/// Nested message depth at which decoding gives up
const MAX_DEPTH: usize = 64;

/// Byte order aware cursor over a payload
pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    little_endian: bool,
}

macro_rules! read_number {
    ($name:ident, $ty:ty) => {
        pub(crate) fn $name(&mut self) -> DecodeResult<$ty> {
            let bytes = self.take(std::mem::size_of::<$ty>())?;
            let mut raw = [0u8; std::mem::size_of::<$ty>()];
            raw.copy_from_slice(bytes);
            Ok(if self.little_endian {
                <$ty>::from_le_bytes(raw)
            } else {
                <$ty>::from_be_bytes(raw)
            })
        }
    };
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(data: &'a [u8], little_endian: bool) -> Self {
        Self {
            data,
            pos: 0,
            little_endian,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        let end = self.pos.checked_add(len).unwrap_or(usize::MAX);
        if end > self.data.len() {
            return Err(DecodeError::DataTooShort {
                expected: end,
                actual: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.take(len).map(|_| ())
    }

    read_number!(read_u8, u8);
    read_number!(read_i8, i8);
    read_number!(read_u16, u16);
    read_number!(read_i16, i16);
    read_number!(read_u32, u32);
    read_number!(read_i32, i32);
    read_number!(read_u64, u64);
    read_number!(read_i64, i64);
    read_number!(read_f32, f32);
    read_number!(read_f64, f64);
}

/// Serialization-specific reads
pub(crate) trait PrimitiveReader {
    fn read_primitive(&mut self, primitive: Primitive) -> DecodeResult<Value>;

    /// Element count prefix of a dynamic array
    fn read_length(&mut self) -> DecodeResult<usize>;

    /// Bytes left in the payload
    fn remaining(&self) -> usize;
}

/// Read the fixed-width numeric primitives shared by both serializations
pub(crate) fn read_number(cursor: &mut ByteCursor<'_>, primitive: Primitive) -> DecodeResult<Value> {
    let value = match primitive {
        Primitive::Bool => json!(cursor.read_u8()? != 0),
        Primitive::Int8 => json!(cursor.read_i8()?),
        Primitive::Uint8 => json!(cursor.read_u8()?),
        Primitive::Int16 => json!(cursor.read_i16()?),
        Primitive::Uint16 => json!(cursor.read_u16()?),
        Primitive::Int32 => json!(cursor.read_i32()?),
        Primitive::Uint32 => json!(cursor.read_u32()?),
        Primitive::Int64 => json!(cursor.read_i64()?),
        Primitive::Uint64 => json!(cursor.read_u64()?),
        Primitive::Float32 => Value::from(f64::from(cursor.read_f32()?)),
        Primitive::Float64 => Value::from(cursor.read_f64()?),
        other => {
            return Err(DecodeError::InvalidData(format!(
                "{:?} is not a numeric primitive",
                other
            )))
        }
    };
    Ok(value)
}

/// Decode the root message of `definitions`
pub(crate) fn decode_message<R: PrimitiveReader>(
    definitions: &DefinitionSet,
    reader: &mut R,
) -> DecodeResult<Value> {
    let root = definitions.root()?;
    decode_fields(definitions, &root.fields, reader, 0)
}

fn decode_fields<R: PrimitiveReader>(
    definitions: &DefinitionSet,
    fields: &[Field],
    reader: &mut R,
    depth: usize,
) -> DecodeResult<Value> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::InvalidData(
            "message definition nests too deeply".to_string(),
        ));
    }

    let mut object = Map::with_capacity(fields.len());
    for field in fields {
        let value = match field.arity {
            Arity::Single => decode_element(definitions, &field.kind, reader, depth)?,
            Arity::Fixed(len) => decode_array(definitions, &field.kind, len, reader, depth)?,
            Arity::Dynamic => {
                let len = reader.read_length()?;
                // A counted run of nested messages is charged one byte per
                // element, so a forged count over an empty type stays bounded.
                if matches!(field.kind, FieldKind::Complex(_)) {
                    check_count(len, 1, reader)?;
                }
                decode_array(definitions, &field.kind, len, reader, depth)?
            }
        };
        object.insert(field.name.clone(), value);
    }
    Ok(Value::Object(object))
}

fn decode_array<R: PrimitiveReader>(
    definitions: &DefinitionSet,
    kind: &FieldKind,
    len: usize,
    reader: &mut R,
    depth: usize,
) -> DecodeResult<Value> {
    if let FieldKind::Primitive(primitive) = kind {
        check_count(len, primitive.byte_size().unwrap_or(4), reader)?;
    }

    let mut values = Vec::with_capacity(len.min(reader.remaining()));
    for _ in 0..len {
        values.push(decode_element(definitions, kind, reader, depth)?);
    }
    Ok(Value::Array(values))
}

fn check_count<R: PrimitiveReader>(len: usize, min_size: usize, reader: &R) -> DecodeResult<()> {
    let needed = len.saturating_mul(min_size);
    if needed > reader.remaining() {
        return Err(DecodeError::DataTooShort {
            expected: needed,
            actual: reader.remaining(),
        });
    }
    Ok(())
}

fn decode_element<R: PrimitiveReader>(
    definitions: &DefinitionSet,
    kind: &FieldKind,
    reader: &mut R,
    depth: usize,
) -> DecodeResult<Value> {
    match kind {
        FieldKind::Primitive(primitive) => reader.read_primitive(*primitive),
        FieldKind::Complex(name) => {
            let definition = definitions.get(name)?;
            decode_fields(definitions, &definition.fields, reader, depth + 1)
        }
    }
}
