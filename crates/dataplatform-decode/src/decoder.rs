//! The decoder interface and built-in decoder construction

use std::sync::Arc;

use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};
use crate::types::{Message, Schema, SchemaEncoding};

/// Turns one serialized message into an application-level value
pub trait Decoder: Send + Sync {
    fn decode(&self, schema: &Schema, message: &Message) -> DecodeResult<Value>;
}

impl<F> Decoder for F
where
    F: Fn(&Schema, &Message) -> DecodeResult<Value> + Send + Sync,
{
    fn decode(&self, schema: &Schema, message: &Message) -> DecodeResult<Value> {
        self(schema, message)
    }
}

/// Decoder for `jsonschema` messages: the payload is UTF-8 JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, _schema: &Schema, message: &Message) -> DecodeResult<Value> {
        let text = std::str::from_utf8(&message.data)
            .map_err(|e| DecodeError::InvalidData(format!("payload is not UTF-8: {}", e)))?;
        Ok(serde_json::from_str(text)?)
    }
}

/// Construct the built-in decoder for a schema encoding tag
///
/// Fails with [`DecodeError::Unsupported`] for tags outside the known set and
/// with [`DecodeError::Unavailable`] when the decoder was compiled out.
pub fn builtin_decoder(tag: &str) -> DecodeResult<Arc<dyn Decoder>> {
    let encoding =
        SchemaEncoding::from_tag(tag).ok_or_else(|| DecodeError::Unsupported(tag.to_string()))?;

    if !encoding.is_available() {
        return Err(DecodeError::Unavailable {
            encoding: tag.to_string(),
            feature: encoding.feature(),
        });
    }

    construct(encoding)
}

fn construct(encoding: SchemaEncoding) -> DecodeResult<Arc<dyn Decoder>> {
    match encoding {
        SchemaEncoding::JsonSchema => Ok(Arc::new(JsonDecoder)),
        #[cfg(feature = "ros1")]
        SchemaEncoding::Ros1Msg => Ok(Arc::new(crate::ros1::Ros1Decoder::new())),
        #[cfg(feature = "ros2")]
        SchemaEncoding::Ros2Msg => Ok(Arc::new(crate::cdr::Ros2Decoder::new())),
        #[cfg(feature = "protobuf")]
        SchemaEncoding::Protobuf => Ok(Arc::new(crate::protobuf::ProtobufDecoder::new())),
        #[allow(unreachable_patterns)]
        other => Err(DecodeError::Unavailable {
            encoding: other.as_str().to_string(),
            feature: other.feature(),
        }),
    }
}
