//! Sequential reader over a downloaded MCAP container
//!
//! Wraps [`mcap::MessageStream`] and converts its borrowed records into the
//! owned [`Schema`]/[`Message`] types the decoders take. Schemas and channels
//! are shared between records through `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use dataplatform_decode::{Message, Schema};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A channel record: one named stream sharing a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: u16,
    pub topic: String,
    pub message_encoding: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// One message together with its schema and channel
#[derive(Debug, Clone)]
pub struct Record {
    pub schema: Arc<Schema>,
    pub channel: Arc<Channel>,
    pub message: Message,
}

/// Yields records in container order
pub struct RecordReader<'a> {
    stream: mcap::MessageStream<'a>,
    schemas: HashMap<u16, Arc<Schema>>,
    channels: HashMap<u16, Arc<Channel>>,
}

impl<'a> RecordReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Ok(Self {
            stream: mcap::MessageStream::new(data)?,
            schemas: HashMap::new(),
            channels: HashMap::new(),
        })
    }

    fn convert(&mut self, message: mcap::Message<'_>) -> Record {
        let source = &message.channel;

        let schema = match &source.schema {
            Some(schema) => self
                .schemas
                .entry(schema.id)
                .or_insert_with(|| {
                    Arc::new(Schema {
                        id: schema.id,
                        name: schema.name.clone(),
                        encoding: schema.encoding.clone(),
                        data: schema.data.to_vec(),
                    })
                })
                .clone(),
            // Schemaless channels: the empty encoding never resolves to a decoder
            None => self
                .schemas
                .entry(0)
                .or_insert_with(|| {
                    Arc::new(Schema {
                        id: 0,
                        name: String::new(),
                        encoding: String::new(),
                        data: Vec::new(),
                    })
                })
                .clone(),
        };

        let channel = self
            .channels
            .entry(source.id)
            .or_insert_with(|| {
                Arc::new(Channel {
                    id: source.id,
                    topic: source.topic.clone(),
                    message_encoding: source.message_encoding.clone(),
                    metadata: source.metadata.clone(),
                })
            })
            .clone();

        Record {
            schema,
            channel,
            message: Message {
                channel_id: source.id,
                sequence: message.sequence,
                log_time: message.log_time,
                publish_time: message.publish_time,
                data: message.data.into_owned(),
            },
        }
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stream.next()? {
            Ok(message) => Some(Ok(self.convert(message))),
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl std::fmt::Debug for RecordReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordReader")
            .field("schemas", &self.schemas.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}
