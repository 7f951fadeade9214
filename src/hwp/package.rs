//! HWP package: the compound file plus the header-derived decoding rules.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use log::{debug, warn};

use super::consts::{DOC_INFO_STREAM, FILE_HEADER_STREAM};
use super::header::FileHeader;
use super::record::{RecordBody, RecordReader};
use super::scanner::HwpContentScanner;
use super::stream::{open_doc_info_stream, open_section_stream, section_path};
use crate::common::{Error, Result};
use crate::ole::{OleFile, StreamStorage};

/// An opened HWP v5 document.
///
/// Reading the package validates the FileHeader, rejects password-protected
/// documents and reads the section count from DocInfo. Section streams are
/// opened on demand.
///
/// # Examples
///
/// ```rust,no_run
/// use hwptext::hwp::HwpPackage;
/// use hwptext::document::ContentSource;
///
/// let mut package = HwpPackage::open_path("report.hwp")?;
/// println!("version {}", package.header().version);
///
/// let mut content = package.content();
/// while let Some(node) = content.next_node()? {
///     println!("{:?}", node);
/// }
/// # Ok::<(), hwptext::Error>(())
/// ```
pub struct HwpPackage<S: StreamStorage = OleFile<File>> {
    storage: S,
    header: FileHeader,
    section_count: usize,
}

impl HwpPackage<OleFile<File>> {
    /// Open a .hwp file from disk.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        HwpPackage::from_reader(file)
    }
}

impl<R: Read + Seek> HwpPackage<OleFile<R>> {
    /// Open from any seekable byte source holding a compound file.
    pub fn from_reader(reader: R) -> Result<Self> {
        let ole = OleFile::open(reader)?;
        HwpPackage::open(ole)
    }
}

impl<S: StreamStorage> HwpPackage<S> {
    /// Open a document from its stream container.
    pub fn open(mut storage: S) -> Result<Self> {
        let header = FileHeader::parse(&storage.read_stream(&[FILE_HEADER_STREAM])?)?;
        debug!(
            "HWP {} properties=0x{:X}",
            header.version,
            header.properties.bits()
        );

        if header.is_password_encrypted() {
            return Err(Error::UnsupportedDocument(
                "password encrypted documents are not supported".to_string(),
            ));
        }

        let doc_info = storage.read_stream(&[DOC_INFO_STREAM])?;
        let section_count = read_section_count(doc_info, &header)?;
        debug!("{} section(s)", section_count);

        Ok(Self {
            storage,
            header,
            section_count,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn section_count(&self) -> usize {
        self.section_count
    }

    /// Whether section bodies live in the encrypted ViewText storage.
    pub fn is_distribution(&self) -> bool {
        self.header.is_distribution()
    }

    /// Open section `index` with decryption and decompression applied.
    pub fn open_section(&mut self, index: usize) -> Result<Box<dyn Read>> {
        let [dir, name] = section_path(index, self.is_distribution());
        debug!("opening {}/{}", dir, name);
        let raw = self.storage.read_stream(&[dir.as_str(), name.as_str()])?;
        open_section_stream(raw, &self.header)
    }

    /// Pull-based content scanner over all sections in order.
    pub fn content(&mut self) -> HwpContentScanner<'_, S> {
        HwpContentScanner::new(self)
    }
}

/// Scan DocInfo for DOCUMENT_PROPERTIES. Absent or zero means one section.
fn read_section_count(doc_info: Vec<u8>, header: &FileHeader) -> Result<usize> {
    let mut records = RecordReader::new(open_doc_info_stream(doc_info, header));
    while let Some(record) = records.next_record()? {
        if let RecordBody::DocumentProperties { section_count } = record.body {
            if section_count == 0 {
                warn!("DocInfo declares zero sections, assuming 1");
                return Ok(1);
            }
            return Ok(section_count as usize);
        }
    }
    warn!("DocInfo has no document properties record, assuming 1 section");
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwp::header::{FileProperties, Version};
    use crate::hwp::test_support::{doc_info, header_bytes, storage};
    use crate::ole::MemoryStorage;

    #[test]
    fn test_open_reads_section_count() {
        let package = HwpPackage::open(storage(FileProperties::empty(), doc_info(3))).unwrap();
        assert_eq!(package.section_count(), 3);
        assert!(!package.is_distribution());
        assert_eq!(package.header().version.to_string(), "5.1.0.1");
    }

    #[test]
    fn test_compressed_doc_info() {
        use crate::hwp::test_support::deflate;
        let package = HwpPackage::open(storage(
            FileProperties::COMPRESSED,
            deflate(&doc_info(2)),
        ))
        .unwrap();
        assert_eq!(package.section_count(), 2);
    }

    #[test]
    fn test_zero_sections_defaults_to_one() {
        let package = HwpPackage::open(storage(FileProperties::empty(), doc_info(0))).unwrap();
        assert_eq!(package.section_count(), 1);

        let package = HwpPackage::open(storage(FileProperties::empty(), Vec::new())).unwrap();
        assert_eq!(package.section_count(), 1);
    }

    #[test]
    fn test_password_rejected_before_doc_info() {
        let mut storage = MemoryStorage::new();
        storage.insert(
            "FileHeader",
            FileHeader::encode(
                Version::from_u32(0x0500_0000),
                FileProperties::PASSWORD_ENCRYPTED,
            ),
        );
        // No DocInfo: the header check must fail first
        let result = HwpPackage::open(storage);
        assert!(matches!(result, Err(Error::UnsupportedDocument(_))));
    }

    #[test]
    fn test_missing_doc_info() {
        let mut storage = MemoryStorage::new();
        storage.insert("FileHeader", header_bytes(FileProperties::empty()));
        let err = HwpPackage::open(storage).err().unwrap();
        assert!(matches!(err, Error::StreamNotFound(_)));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_missing_file_header() {
        let result = HwpPackage::open(MemoryStorage::new());
        assert!(matches!(result, Err(Error::StreamNotFound(_))));
    }

    #[test]
    fn test_open_section_missing() {
        let mut package = HwpPackage::open(storage(FileProperties::empty(), doc_info(1))).unwrap();
        assert!(matches!(package.open_section(0), Err(Error::StreamNotFound(_))));
    }

    #[test]
    fn test_open_section_uses_view_text_for_distribution() {
        let mut storage = storage(FileProperties::DISTRIBUTION, doc_info(1));
        storage.insert("BodyText/Section0", vec![0; 16]);
        let mut package = HwpPackage::open(storage).unwrap();
        assert!(package.is_distribution());
        assert!(matches!(package.open_section(0), Err(Error::StreamNotFound(p)) if p == "ViewText/Section0"));
    }
}
