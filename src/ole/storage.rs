//! Named-stream access over a container.
//!
//! The HWP decoder only ever needs "give me the bytes of the stream at this
//! path". [`StreamStorage`] captures that contract so the decoder works the
//! same over a real compound file and over an in-memory map.

use std::collections::HashMap;
use std::io::{Read, Seek};

use super::file::OleFile;
use crate::common::{Error, Result};

/// A container of named streams addressed by storage path.
pub trait StreamStorage {
    /// Read the whole stream at `path` (e.g. `["BodyText", "Section0"]`).
    ///
    /// A missing stream is reported as [`Error::StreamNotFound`].
    fn read_stream(&mut self, path: &[&str]) -> Result<Vec<u8>>;

    /// Whether a stream or storage exists at `path`.
    fn has_stream(&self, path: &[&str]) -> bool;
}

impl<R: Read + Seek> StreamStorage for OleFile<R> {
    fn read_stream(&mut self, path: &[&str]) -> Result<Vec<u8>> {
        self.open_stream(path).map_err(Error::from)
    }

    fn has_stream(&self, path: &[&str]) -> bool {
        self.exists(path)
    }
}

/// In-memory stream container keyed by `/`-joined path.
///
/// Lookups are case-insensitive, like compound file directory lookups.
///
/// # Examples
///
/// ```
/// use hwptext::ole::{MemoryStorage, StreamStorage};
///
/// let mut storage = MemoryStorage::new();
/// storage.insert("BodyText/Section0", vec![1, 2, 3]);
/// assert!(storage.has_stream(&["bodytext", "section0"]));
/// assert_eq!(storage.read_stream(&["BodyText", "Section0"]).unwrap(), vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    streams: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a stream.
    pub fn insert(&mut self, path: &str, data: Vec<u8>) {
        self.streams.insert(path.to_lowercase(), data);
    }

    fn key(path: &[&str]) -> String {
        path.join("/").to_lowercase()
    }
}

impl StreamStorage for MemoryStorage {
    fn read_stream(&mut self, path: &[&str]) -> Result<Vec<u8>> {
        self.streams
            .get(&Self::key(path))
            .cloned()
            .ok_or_else(|| Error::StreamNotFound(path.join("/")))
    }

    fn has_stream(&self, path: &[&str]) -> bool {
        self.streams.contains_key(&Self::key(path))
    }
}
