//! hwptext - plain-text extraction from HWP documents
//!
//! This library reads binary HWP v5 word-processor documents and renders
//! their paragraphs, tables and drawing-object placeholders as plain text,
//! with tables drawn as ASCII grids.
//!
//! # Features
//!
//! - **Compound file reader**: FAT/MiniFAT stream access without external tools
//! - **Distribution documents**: ViewText sections are decrypted on the fly
//! - **Compressed streams**: raw DEFLATE sections are inflated while reading
//! - **Streaming**: content is produced one node at a time, section by section
//! - **Merged cells**: row and column spans are laid out with East Asian width awareness
//!
//! # Example - Render a document
//!
//! ```no_run
//! # fn main() -> Result<(), hwptext::Error> {
//! let mut out = std::io::stdout().lock();
//! hwptext::read_path("report.hwp", &mut out)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Walk the content nodes
//!
//! ```no_run
//! use hwptext::document::ContentNode;
//! use hwptext::hwp::HwpPackage;
//!
//! # fn main() -> Result<(), hwptext::Error> {
//! let mut package = HwpPackage::open_path("report.hwp")?;
//! for node in package.content() {
//!     match node? {
//!         ContentNode::Paragraph(p) => println!("{}", p.text),
//!         ContentNode::Table(t) => println!("table with {} cells", t.cells.len()),
//!         ContentNode::Image(_) => println!("[image]"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

/// Common types, errors and binary helpers
pub mod common;

/// Format-neutral content model and the producer trait
pub mod document;

/// Binary HWP v5 decoder
pub mod hwp;

/// Compound file (OLE2 structured storage) reader
pub mod ole;

/// Plain-text renderer
pub mod render;

pub use common::{Error, Format, Result};
pub use document::{ContentNode, ContentSource};
pub use hwp::HwpPackage;
pub use render::TextOptions;

/// Render an HWP document read from `reader` to `out` with default options.
pub fn read_hwp<R: Read + Seek, W: Write>(reader: R, out: W) -> Result<()> {
    read_hwp_with(reader, &TextOptions::default(), out)
}

/// Render an HWP document read from `reader` to `out`.
pub fn read_hwp_with<R: Read + Seek, W: Write>(
    reader: R,
    options: &TextOptions,
    out: W,
) -> Result<()> {
    let mut package = HwpPackage::from_reader(reader)?;
    let mut renderer = render::TextRenderer::new(out, options.clone());
    renderer.render_all(package.content())
}

/// Render the document at `path`, picking the format from its extension.
pub fn read_path<P: AsRef<Path>, W: Write>(path: P, out: W) -> Result<()> {
    let format = Format::from_path(&path);
    read_path_with(path, format, &TextOptions::default(), out)
}

/// Render the document at `path` as the given format.
///
/// HWPX is recognised but not decoded and yields [`Error::Unsupported`].
pub fn read_path_with<P: AsRef<Path>, W: Write>(
    path: P,
    format: Format,
    options: &TextOptions,
    out: W,
) -> Result<()> {
    match format {
        Format::Hwp => {
            let file = BufReader::new(File::open(path)?);
            read_hwp_with(file, options, out)
        },
        Format::Hwpx => Err(Error::Unsupported(
            "HWPX documents are not supported".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwp::consts::*;
    use crate::hwp::header::FileProperties;
    use crate::hwp::record::CtrlId;
    use crate::hwp::test_support::{StreamBuilder, deflate, doc_info, header_bytes};
    use crate::ole::test_writer::CompoundFileBuilder;
    use std::io::Cursor;

    fn sample_section() -> Vec<u8> {
        let mut s = StreamBuilder::new();
        s.paragraph(0, "before");
        s.record(HWPTAG_PARA_HEADER, 0, &[0; 22])
            .para_text(1, &[11, 0, 0, 0, 0, 0, 0, 11, 13])
            .record(HWPTAG_PARA_CHAR_SHAPE, 1, &[0; 8])
            .ctrl(1, CtrlId::TABLE)
            .table(2, 1, 2);
        s.cell(2, 0, 0, 1, 1).paragraph(2, "A");
        s.cell(2, 0, 1, 1, 1).paragraph(2, "B");
        s.paragraph(0, "after");
        s.ctrl(1, CtrlId::DRAWING_OBJECT);
        s.paragraph(0, "end");
        s.build()
    }

    fn compressed_document() -> Vec<u8> {
        CompoundFileBuilder::new()
            .add_stream(FILE_HEADER_STREAM, header_bytes(FileProperties::COMPRESSED))
            .add_stream(DOC_INFO_STREAM, deflate(&doc_info(1)))
            .add_stream("BodyText/Section0", deflate(&sample_section()))
            .build()
    }

    const EXPECTED: &str = "before\n\n+---+---+\n| A | B |\n+---+---+\n\nafter\n[IMAGE]\nend\n";

    #[test]
    fn test_read_hwp_end_to_end() {
        let mut out = Vec::new();
        read_hwp(Cursor::new(compressed_document()), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), EXPECTED);
    }

    #[test]
    fn test_read_hwp_with_options() {
        let options = TextOptions::new()
            .with_image_placeholder("<img>")
            .with_blank_line_after_table(false);
        let mut out = Vec::new();
        read_hwp_with(Cursor::new(compressed_document()), &options, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "before\n\n+---+---+\n| A | B |\n+---+---+\nafter\n<img>\nend\n"
        );
    }

    #[test]
    fn test_read_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.hwp");
        std::fs::write(&path, compressed_document()).unwrap();

        let mut out = Vec::new();
        read_path(&path, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), EXPECTED);
    }

    #[test]
    fn test_hwpx_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.hwpx");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let result = read_path(&path, Vec::new());
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_path(dir.path().join("absent.hwp"), Vec::new());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_not_a_compound_file() {
        let result = read_hwp(Cursor::new(vec![0u8; 4096]), Vec::new());
        assert!(matches!(result, Err(ref e) if e.is_malformed()));
    }
}
