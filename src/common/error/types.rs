//! Unified error types for hwptext.
//!
//! Decode failures fall into a small taxonomy: the document is of a kind this
//! crate refuses to read, the container or record stream is malformed, or the
//! underlying byte source failed. Reaching the end of a document's content is
//! not an error and is reported as `Ok(None)` by content sources.
use thiserror::Error;

/// Main error type for hwptext operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from the underlying byte source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document uses a protection scheme that is not supported (password encryption)
    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    /// Bad signature, truncated or misaligned data, or invalid key material
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// A required named stream is missing from the container
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// Requested input format is not decoded by this crate
    #[error("Unsupported format: {0}")]
    Unsupported(String),
}

impl Error {
    /// Shorthand for building a [`Error::MalformedContainer`].
    #[inline]
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedContainer(msg.into())
    }

    /// Whether this error means the container or record stream is malformed.
    ///
    /// A missing stream counts as a malformed container.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedContainer(_) | Error::StreamNotFound(_))
    }
}

/// Result type for hwptext operations.
pub type Result<T> = std::result::Result<T, Error>;
