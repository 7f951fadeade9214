//! Input format selection.
//!
//! The caller either names the format explicitly or lets it be picked from
//! the file extension. Signature sniffing is available for byte buffers whose
//! name is unknown.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::common::{Error, Result};
use crate::ole::consts::MAGIC;

/// ZIP local file header signature, used by the XML-based sibling format.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Document formats known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Binary HWP v5 (.hwp): compound file container with record streams
    Hwp,
    /// XML-based HWPX (.hwpx): ZIP container with OWPML sections
    Hwpx,
}

impl Format {
    /// Pick a format from a file extension.
    ///
    /// `.hwpx` (any case) selects [`Format::Hwpx`]; every other extension,
    /// including none, selects [`Format::Hwp`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hwptext::Format;
    ///
    /// assert_eq!(Format::from_path("report.HWPX"), Format::Hwpx);
    /// assert_eq!(Format::from_path("report.hwp"), Format::Hwp);
    /// assert_eq!(Format::from_path("report"), Format::Hwp);
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("hwpx") => Format::Hwpx,
            _ => Format::Hwp,
        }
    }

    /// Identify a format from the leading bytes of a file.
    pub fn from_signature(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(MAGIC) {
            Some(Format::Hwp)
        } else if bytes.starts_with(ZIP_MAGIC) {
            Some(Format::Hwpx)
        } else {
            None
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Hwp => "hwp",
            Format::Hwpx => "hwpx",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hwp" => Ok(Format::Hwp),
            "hwpx" => Ok(Format::Hwpx),
            other => Err(Error::Unsupported(format!("unknown format '{}'", other))),
        }
    }
}
