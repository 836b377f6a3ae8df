//! Decoder selection by schema encoding tag

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dataplatform_decode::{builtin_decoder, DecodeError, Decoder};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{DataPlatformError, Result};

/// Maps schema encoding tags to decoders for one client session
///
/// The mode is fixed at construction:
/// - [`DecoderRegistry::Fixed`] honors only the tags it was given; any other
///   tag fails with [`DataPlatformError::NoDecoder`].
/// - [`DecoderRegistry::AutoLoad`] constructs built-in decoders on first use
///   and caches one instance per tag. Unknown tags fail with
///   [`DataPlatformError::UnknownEncoding`], known tags whose decoder was
///   compiled out with [`DataPlatformError::DecoderUnavailable`].
///
/// The auto-load cache is locked for the whole first resolution of a tag, so
/// concurrent callers never construct two decoders for it.
pub enum DecoderRegistry {
    Fixed(HashMap<String, Arc<dyn Decoder>>),
    AutoLoad(Mutex<HashMap<String, Arc<dyn Decoder>>>),
}

impl DecoderRegistry {
    /// Registry limited to the given decoders
    pub fn fixed<I, K>(decoders: I) -> Self
    where
        I: IntoIterator<Item = (K, Arc<dyn Decoder>)>,
        K: Into<String>,
    {
        Self::Fixed(decoders.into_iter().map(|(k, d)| (k.into(), d)).collect())
    }

    /// Registry that loads built-in decoders as encodings are encountered
    pub fn auto_load() -> Self {
        Self::AutoLoad(Mutex::new(HashMap::new()))
    }

    pub fn is_auto_load(&self) -> bool {
        matches!(self, Self::AutoLoad(_))
    }

    /// Decoder for `encoding`
    pub fn resolve(&self, encoding: &str) -> Result<Arc<dyn Decoder>> {
        match self {
            Self::Fixed(decoders) => {
                decoders
                    .get(encoding)
                    .cloned()
                    .ok_or_else(|| DataPlatformError::NoDecoder {
                        encoding: encoding.to_string(),
                    })
            }
            Self::AutoLoad(cache) => {
                let mut cache = cache.lock();
                if let Some(decoder) = cache.get(encoding) {
                    return Ok(decoder.clone());
                }

                debug!("Loading built-in decoder for {}", encoding);
                let decoder = builtin_decoder(encoding).map_err(|e| match e {
                    DecodeError::Unsupported(encoding) => {
                        DataPlatformError::UnknownEncoding { encoding }
                    }
                    DecodeError::Unavailable { encoding, feature } => {
                        DataPlatformError::DecoderUnavailable { encoding, feature }
                    }
                    other => DataPlatformError::Decode(other),
                })?;
                cache.insert(encoding.to_string(), decoder.clone());
                Ok(decoder)
            }
        }
    }

    /// Tags with a resolved or registered decoder
    pub fn encodings(&self) -> Vec<String> {
        let mut tags: Vec<String> = match self {
            Self::Fixed(decoders) => decoders.keys().cloned().collect(),
            Self::AutoLoad(cache) => cache.lock().keys().cloned().collect(),
        };
        tags.sort();
        tags
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::auto_load()
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.is_auto_load() { "AutoLoad" } else { "Fixed" };
        f.debug_struct("DecoderRegistry")
            .field("mode", &mode)
            .field("encodings", &self.encodings())
            .finish()
    }
}
