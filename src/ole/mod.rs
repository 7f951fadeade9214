/// Constants for the compound file format
pub mod consts;

/// Compound file (OLE2 structured storage) reader
mod file;

#[cfg(test)]
pub(crate) mod test_writer;

/// Named-stream access shared by the compound file and in-memory containers
mod storage;

// Re-export public types for convenient access
pub use file::{DirectoryEntry, OleError, OleFile, is_ole_file};
pub use storage::{MemoryStorage, StreamStorage};
