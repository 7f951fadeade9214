//! Record tags, control identifiers and stream names of the HWP v5 format.

/// First tag value used by DocInfo/BodyText records
pub const HWPTAG_BEGIN: u16 = 0x10;

// DocInfo records
/// Document properties (section count, starting numbers, caret position)
pub const HWPTAG_DOCUMENT_PROPERTIES: u16 = HWPTAG_BEGIN;
/// Distribution document header record, first thing in a ViewText section
pub const HWPTAG_DISTRIBUTE_DOC_DATA: u16 = HWPTAG_BEGIN + 12;

// Section (BodyText/ViewText) records
pub const HWPTAG_PARA_HEADER: u16 = HWPTAG_BEGIN + 50;
pub const HWPTAG_PARA_TEXT: u16 = HWPTAG_BEGIN + 51;
pub const HWPTAG_PARA_CHAR_SHAPE: u16 = HWPTAG_BEGIN + 52;
pub const HWPTAG_PARA_LINE_SEG: u16 = HWPTAG_BEGIN + 53;
pub const HWPTAG_PARA_RANGE_TAG: u16 = HWPTAG_BEGIN + 54;
pub const HWPTAG_CTRL_HEADER: u16 = HWPTAG_BEGIN + 55;
pub const HWPTAG_LIST_HEADER: u16 = HWPTAG_BEGIN + 56;
pub const HWPTAG_PAGE_DEF: u16 = HWPTAG_BEGIN + 57;
pub const HWPTAG_FOOTNOTE_SHAPE: u16 = HWPTAG_BEGIN + 58;
pub const HWPTAG_PAGE_BORDER_FILL: u16 = HWPTAG_BEGIN + 59;
pub const HWPTAG_SHAPE_COMPONENT: u16 = HWPTAG_BEGIN + 60;
pub const HWPTAG_TABLE: u16 = HWPTAG_BEGIN + 61;
pub const HWPTAG_SHAPE_COMPONENT_LINE: u16 = HWPTAG_BEGIN + 62;
pub const HWPTAG_SHAPE_COMPONENT_RECTANGLE: u16 = HWPTAG_BEGIN + 63;
pub const HWPTAG_SHAPE_COMPONENT_ELLIPSE: u16 = HWPTAG_BEGIN + 64;
pub const HWPTAG_SHAPE_COMPONENT_ARC: u16 = HWPTAG_BEGIN + 65;
pub const HWPTAG_SHAPE_COMPONENT_POLYGON: u16 = HWPTAG_BEGIN + 66;
pub const HWPTAG_SHAPE_COMPONENT_CURVE: u16 = HWPTAG_BEGIN + 67;
pub const HWPTAG_SHAPE_COMPONENT_OLE: u16 = HWPTAG_BEGIN + 68;
pub const HWPTAG_SHAPE_COMPONENT_PICTURE: u16 = HWPTAG_BEGIN + 69;
pub const HWPTAG_SHAPE_COMPONENT_CONTAINER: u16 = HWPTAG_BEGIN + 70;
pub const HWPTAG_CTRL_DATA: u16 = HWPTAG_BEGIN + 71;
pub const HWPTAG_EQEDIT: u16 = HWPTAG_BEGIN + 72;
pub const HWPTAG_SHAPE_COMPONENT_TEXTART: u16 = HWPTAG_BEGIN + 74;
pub const HWPTAG_FORM_OBJECT: u16 = HWPTAG_BEGIN + 75;
pub const HWPTAG_MEMO_SHAPE: u16 = HWPTAG_BEGIN + 76;
pub const HWPTAG_MEMO_LIST: u16 = HWPTAG_BEGIN + 77;
pub const HWPTAG_CHART_DATA: u16 = HWPTAG_BEGIN + 79;
pub const HWPTAG_VIDEO_DATA: u16 = HWPTAG_BEGIN + 82;
pub const HWPTAG_SHAPE_COMPONENT_UNKNOWN: u16 = HWPTAG_BEGIN + 99;

/// Inline size field value that announces a trailing 32-bit size
pub const EXTENDED_SIZE_MARKER: u32 = 0xFFF;

/// Size of the distribution data block that precedes encrypted section data
pub const DISTRIBUTE_DATA_SIZE: usize = 256;

/// Size in bytes of the FileHeader stream
pub const FILE_HEADER_SIZE: usize = 256;

/// Signature at the start of the FileHeader stream (NUL padded to 32 bytes)
pub const SIGNATURE: &str = "HWP Document File";

// Stream names
pub const FILE_HEADER_STREAM: &str = "FileHeader";
pub const DOC_INFO_STREAM: &str = "DocInfo";
pub const BODY_TEXT_STORAGE: &str = "BodyText";
pub const VIEW_TEXT_STORAGE: &str = "ViewText";
