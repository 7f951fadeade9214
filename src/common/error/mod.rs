//! Unified error types for hwptext.
//!
//! This module provides a single error type that covers every layer of the
//! decoder, from the compound-file container up to the text renderer.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
