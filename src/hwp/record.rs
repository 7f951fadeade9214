//! Record framing and typed record decoding.
//!
//! Every HWP data stream (DocInfo, BodyText/ViewText sections) is a flat
//! sequence of records. Each record starts with a packed 32-bit header:
//!
//! ```text
//!  31          20 19          10 9           0
//! +--------------+--------------+-------------+
//! |     size     |    level     |    tag      |
//! +--------------+--------------+-------------+
//! ```
//!
//! A size of `0xFFF` means the real size follows as a separate u32. Nesting is
//! expressed only through `level`: a record belongs to the nearest preceding
//! record with a lower level.

use std::fmt;
use std::io::{self, Read, Write};

use bytes::Bytes;
use log::trace;

use super::consts::*;
use super::para_text::{self, ParaTextElement};
use crate::common::binary::{read_i16_le, read_u16_le, read_u32_le};
use crate::common::{Error, Result};

/// Decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag: u16,
    pub level: u16,
    pub size: u32,
}

impl RecordHeader {
    /// Unpack the inline header word.
    #[inline]
    pub fn from_u32(raw: u32) -> Self {
        Self {
            tag: (raw & 0x3FF) as u16,
            level: ((raw >> 10) & 0x3FF) as u16,
            size: (raw >> 20) & 0xFFF,
        }
    }

    /// Write the header, using the extended form when `size` does not fit inline.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let base = (self.tag as u32 & 0x3FF) | ((self.level as u32 & 0x3FF) << 10);
        if self.size >= EXTENDED_SIZE_MARKER {
            out.write_all(&(base | (EXTENDED_SIZE_MARKER << 20)).to_le_bytes())?;
            out.write_all(&self.size.to_le_bytes())
        } else {
            out.write_all(&(base | (self.size << 20)).to_le_bytes())
        }
    }
}

/// Four-character control identifier carried by CTRL_HEADER records.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtrlId(pub u32);

impl CtrlId {
    /// Table control, `'tbl '`
    pub const TABLE: CtrlId = CtrlId::from_chars(*b"tbl ");
    /// Drawing object control, `'gso '`
    pub const DRAWING_OBJECT: CtrlId = CtrlId::from_chars(*b"gso ");

    /// Build an id from its four characters, first character most significant.
    pub const fn from_chars(chars: [u8; 4]) -> Self {
        CtrlId(u32::from_be_bytes(chars))
    }

    pub fn to_chars(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for CtrlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_chars() {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CtrlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CtrlId('{}')", self)
    }
}

/// Position and extent of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddress {
    pub row: u16,
    pub col: u16,
    pub row_span: u16,
    pub col_span: u16,
}

/// LIST_HEADER payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListHeader {
    pub para_count: i16,
    pub property: u32,
    /// Present when the list is a table cell
    pub cell: Option<CellAddress>,
}

impl ListHeader {
    /// Payload size from which a list header carries cell properties.
    pub const CELL_PAYLOAD_SIZE: usize = 33;
    const CELL_BLOCK_OFFSET: usize = 7;

    pub fn parse(data: &[u8]) -> Self {
        let mut header = ListHeader::default();
        if data.len() >= 6 {
            header.para_count = read_i16_le(data, 0).unwrap_or_default();
            header.property = read_u32_le(data, 2).unwrap_or_default();
        }
        if data.len() >= Self::CELL_PAYLOAD_SIZE {
            let block = &data[Self::CELL_BLOCK_OFFSET..Self::CELL_PAYLOAD_SIZE];
            let span = |b: u8| if b == 0 { 1 } else { b as u16 };
            header.cell = Some(CellAddress {
                col: block[1] as u16,
                row: block[3] as u16,
                col_span: span(block[5]),
                row_span: span(block[7]),
            });
        }
        header
    }
}

/// TABLE payload: declared grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableInfo {
    pub rows: u16,
    pub cols: u16,
}

impl TableInfo {
    pub fn parse(data: &[u8]) -> Self {
        if data.len() < 8 {
            return TableInfo::default();
        }
        TableInfo {
            rows: read_u16_le(data, 4).unwrap_or_default(),
            cols: read_u16_le(data, 6).unwrap_or_default(),
        }
    }
}

/// Typed record payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    ParaHeader,
    ParaText(Vec<ParaTextElement>),
    ParaCharShape,
    ParaLineSeg,
    ParaRangeTag,
    CtrlHeader { ctrl_id: CtrlId, data: Bytes },
    ListHeader(ListHeader),
    Table(TableInfo),
    /// A known section record whose payload is not interpreted
    Shape(u16),
    /// DOCUMENT_PROPERTIES (DocInfo)
    DocumentProperties { section_count: u16 },
    Unknown(Bytes),
}

impl RecordBody {
    fn decode(tag: u16, data: Vec<u8>) -> Self {
        match tag {
            HWPTAG_PARA_HEADER => RecordBody::ParaHeader,
            HWPTAG_PARA_TEXT => RecordBody::ParaText(para_text::decode(&data)),
            HWPTAG_PARA_CHAR_SHAPE => RecordBody::ParaCharShape,
            HWPTAG_PARA_LINE_SEG => RecordBody::ParaLineSeg,
            HWPTAG_PARA_RANGE_TAG => RecordBody::ParaRangeTag,
            HWPTAG_CTRL_HEADER => RecordBody::CtrlHeader {
                ctrl_id: CtrlId(read_u32_le(&data, 0).unwrap_or_default()),
                data: Bytes::from(data),
            },
            HWPTAG_LIST_HEADER => RecordBody::ListHeader(ListHeader::parse(&data)),
            HWPTAG_TABLE => RecordBody::Table(TableInfo::parse(&data)),
            HWPTAG_PAGE_DEF
            | HWPTAG_FOOTNOTE_SHAPE
            | HWPTAG_PAGE_BORDER_FILL
            | HWPTAG_SHAPE_COMPONENT
            | HWPTAG_SHAPE_COMPONENT_LINE
            | HWPTAG_SHAPE_COMPONENT_RECTANGLE
            | HWPTAG_SHAPE_COMPONENT_ELLIPSE
            | HWPTAG_SHAPE_COMPONENT_ARC
            | HWPTAG_SHAPE_COMPONENT_POLYGON
            | HWPTAG_SHAPE_COMPONENT_CURVE
            | HWPTAG_SHAPE_COMPONENT_OLE
            | HWPTAG_SHAPE_COMPONENT_PICTURE
            | HWPTAG_SHAPE_COMPONENT_CONTAINER
            | HWPTAG_CTRL_DATA
            | HWPTAG_EQEDIT
            | HWPTAG_SHAPE_COMPONENT_TEXTART
            | HWPTAG_FORM_OBJECT
            | HWPTAG_MEMO_SHAPE
            | HWPTAG_MEMO_LIST
            | HWPTAG_CHART_DATA
            | HWPTAG_VIDEO_DATA
            | HWPTAG_SHAPE_COMPONENT_UNKNOWN => RecordBody::Shape(tag),
            HWPTAG_DOCUMENT_PROPERTIES if data.len() >= 2 => RecordBody::DocumentProperties {
                section_count: read_u16_le(&data, 0).unwrap_or_default(),
            },
            _ => RecordBody::Unknown(Bytes::from(data)),
        }
    }
}

/// A single decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub header: RecordHeader,
    pub body: RecordBody,
}

impl Record {
    #[inline]
    pub fn tag(&self) -> u16 {
        self.header.tag
    }

    #[inline]
    pub fn level(&self) -> u16 {
        self.header.level
    }
}

/// Pull-based record decoder over a byte stream.
pub struct RecordReader<R: Read> {
    inner: R,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Decode the next record. `Ok(None)` at a clean end of stream.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let mut word = [0u8; 4];
        match read_fully(&mut self.inner, &mut word)? {
            0 => return Ok(None),
            4 => {},
            n => {
                return Err(Error::malformed(format!(
                    "truncated record header ({} of 4 bytes)",
                    n
                )));
            },
        }

        let mut header = RecordHeader::from_u32(u32::from_le_bytes(word));
        if header.size == EXTENDED_SIZE_MARKER {
            if read_fully(&mut self.inner, &mut word)? != 4 {
                return Err(Error::malformed("truncated extended record size"));
            }
            header.size = u32::from_le_bytes(word);
        }

        let mut data = Vec::new();
        let read = (&mut self.inner)
            .take(header.size as u64)
            .read_to_end(&mut data)
            .map_err(map_stream_error)?;
        if read != header.size as usize {
            return Err(Error::malformed(format!(
                "truncated payload for tag 0x{:X}: expected {} bytes, got {}",
                header.tag, header.size, read
            )));
        }

        trace!(
            "record tag=0x{:X} level={} size={}",
            header.tag, header.level, header.size
        );
        let body = RecordBody::decode(header.tag, data);
        Ok(Some(Record { header, body }))
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Read until `buf` is full or the stream ends; returns bytes read.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_stream_error(e)),
        }
    }
    Ok(filled)
}

/// Data errors from the cipher or decompressor layers mean the stream itself is bad.
fn map_stream_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            Error::MalformedContainer(e.to_string())
        },
        _ => Error::Io(e),
    }
}
