//! Common types and utilities shared across the decoder and renderer.

// Submodule declarations
pub mod binary;
pub mod error;
pub mod format;

// Re-exports for convenience
pub use error::{Error, Result};
pub use format::Format;
