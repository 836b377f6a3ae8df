//! Progress-reporting upload body
//!
//! [`ProgressReader`] wraps either an in-memory buffer or an open file and
//! reports `(total, sent)` after every read, which lets callers render upload
//! progress while the HTTP client pulls the body.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};

use bytes::Bytes;

/// Upload progress callback: `(total_length, bytes_read_so_far)`
pub type SizeCallback = Box<dyn FnMut(u64, u64) + Send>;

/// Data to upload
#[derive(Debug)]
pub enum UploadSource {
    /// Complete payload held in memory
    Bytes(Bytes),
    /// Open file, read from its current position
    File(File),
}

impl From<Bytes> for UploadSource {
    fn from(data: Bytes) -> Self {
        UploadSource::Bytes(data)
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(data: Vec<u8>) -> Self {
        UploadSource::Bytes(Bytes::from(data))
    }
}

impl From<&'static [u8]> for UploadSource {
    fn from(data: &'static [u8]) -> Self {
        UploadSource::Bytes(Bytes::from_static(data))
    }
}

impl From<File> for UploadSource {
    fn from(file: File) -> Self {
        UploadSource::File(file)
    }
}

enum Inner {
    Memory(Cursor<Bytes>),
    File(File),
}

/// Byte source that counts what has been read and reports it
///
/// The reported length is fixed at construction: the buffer size for
/// in-memory data, the size reported by the file system for files.
pub struct ProgressReader {
    inner: Inner,
    length: u64,
    position: u64,
    callback: Option<SizeCallback>,
}

impl ProgressReader {
    pub fn new(source: UploadSource, callback: Option<SizeCallback>) -> io::Result<Self> {
        let (inner, length) = match source {
            UploadSource::Bytes(data) => {
                let length = data.len() as u64;
                (Inner::Memory(Cursor::new(data)), length)
            }
            UploadSource::File(file) => {
                let length = file.metadata()?.len();
                (Inner::File(file), length)
            }
        };

        Ok(Self {
            inner,
            length,
            position: 0,
            callback,
        })
    }

    /// Total length reported for the source
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Bytes returned by all reads so far
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Read for ProgressReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &mut self.inner {
            Inner::Memory(cursor) => cursor.read(buf)?,
            Inner::File(file) => file.read(buf)?,
        };
        self.position += n as u64;
        if let Some(callback) = self.callback.as_mut() {
            callback(self.length, self.position);
        }
        Ok(n)
    }
}

impl fmt::Debug for ProgressReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReader")
            .field("length", &self.length)
            .field("position", &self.position)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
