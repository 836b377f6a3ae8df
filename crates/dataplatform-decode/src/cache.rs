//! Per-decoder cache of parsed schemas
//!
//! Schema ids are local to one container, so entries are keyed by the
//! schema's name and payload instead. A decoder that outlives one container
//! then never applies a stale definition to another.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::DecodeResult;
use crate::types::Schema;

#[derive(Debug)]
pub(crate) struct SchemaCache<T> {
    entries: RwLock<HashMap<String, HashMap<Vec<u8>, T>>>,
}

impl<T> Default for SchemaCache<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Clone> SchemaCache<T> {
    /// Cached value for `schema`, built with `parse` on first sight
    pub(crate) fn get_or_parse<F>(&self, schema: &Schema, parse: F) -> DecodeResult<T>
    where
        F: FnOnce(&Schema) -> DecodeResult<T>,
    {
        if let Some(value) = self
            .entries
            .read()
            .get(schema.name.as_str())
            .and_then(|by_data| by_data.get(schema.data.as_slice()))
        {
            return Ok(value.clone());
        }

        let value = parse(schema)?;
        self.entries
            .write()
            .entry(schema.name.clone())
            .or_default()
            .insert(schema.data.clone(), value.clone());
        Ok(value)
    }

    /// Number of distinct schemas parsed
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }
}
