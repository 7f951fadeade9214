//! Binary HWP v5 decoder.
//!
//! An HWP v5 file is a compound file holding a `FileHeader` stream, a
//! `DocInfo` record stream and one record stream per section under
//! `BodyText` (or `ViewText` for distribution documents). Section streams
//! may be AES-128 encrypted and raw-DEFLATE compressed.
//!
//! # Example
//!
//! ```rust,no_run
//! use hwptext::hwp::HwpPackage;
//! use hwptext::document::ContentNode;
//!
//! let mut package = HwpPackage::open_path("report.hwp")?;
//! for node in package.content() {
//!     if let ContentNode::Paragraph(p) = node? {
//!         println!("{}", p.text);
//!     }
//! }
//! # Ok::<(), hwptext::Error>(())
//! ```

pub mod consts;
pub mod crypto;
pub mod header;
mod package;
pub mod para_text;
pub mod record;
mod scanner;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_support;

pub use header::{FileHeader, FileProperties, Version};
pub use package::HwpPackage;
pub use para_text::ParaTextElement;
pub use record::{CtrlId, Record, RecordBody, RecordHeader, RecordReader};
pub use scanner::HwpContentScanner;
