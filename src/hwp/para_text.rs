//! PARA_TEXT payload decoding.
//!
//! A paragraph's text is stored as UTF-16LE code units interleaved with
//! control codes below 32. Extended and inline controls occupy eight code
//! units (the code plus a 14-byte parameter block); char controls occupy one.

use encoding_rs::UTF_16LE;

/// Size in bytes of the parameter block that follows an extended or inline control.
const CONTROL_PARAM_SIZE: usize = 14;

/// How a control code is laid out in the text stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// One code unit, no parameters
    Char,
    /// Eight code units, parameters inline
    Inline,
    /// Eight code units, parameters in a following CTRL_HEADER record
    Extended,
}

impl ControlKind {
    /// Classify a code below 32. Returns `None` for text units and unused codes.
    pub fn of(code: u16) -> Option<Self> {
        match code {
            10 | 13 | 24 | 30 | 31 => Some(ControlKind::Char),
            4 | 5 | 6 | 7 | 8 | 9 | 19 | 20 => Some(ControlKind::Inline),
            2 | 3 | 11 | 12 | 14 | 15 | 16 | 17 | 18 | 21 | 22 | 23 => Some(ControlKind::Extended),
            _ => None,
        }
    }

    /// Bytes consumed after the code unit itself.
    #[inline]
    pub fn param_size(self) -> usize {
        match self {
            ControlKind::Char => 0,
            ControlKind::Inline | ControlKind::Extended => CONTROL_PARAM_SIZE,
        }
    }
}

/// One decoded element of a PARA_TEXT record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParaTextElement {
    /// A run of ordinary characters
    Text(String),
    SectionColumnDef,
    FieldStart,
    FieldEnd,
    TitleMark,
    Tab,
    LineBreak,
    /// Drawing object or table anchor
    DrawingTable,
    ParaBreak,
    HiddenComment,
    HeaderFooter,
    FootnoteEndnote,
    AutoNumber,
    PageControl,
    BookmarkIndex,
    TextOverlap,
    Hyphen,
    BundleSpace,
    FixedSpace,
}

impl ParaTextElement {
    /// Control code that produced this element (0 for text runs).
    pub fn code(&self) -> u16 {
        match self {
            ParaTextElement::Text(_) => 0,
            ParaTextElement::SectionColumnDef => 2,
            ParaTextElement::FieldStart => 3,
            ParaTextElement::FieldEnd => 4,
            ParaTextElement::TitleMark => 8,
            ParaTextElement::Tab => 9,
            ParaTextElement::LineBreak => 10,
            ParaTextElement::DrawingTable => 11,
            ParaTextElement::ParaBreak => 13,
            ParaTextElement::HiddenComment => 15,
            ParaTextElement::HeaderFooter => 16,
            ParaTextElement::FootnoteEndnote => 17,
            ParaTextElement::AutoNumber => 18,
            ParaTextElement::PageControl => 21,
            ParaTextElement::BookmarkIndex => 22,
            ParaTextElement::TextOverlap => 23,
            ParaTextElement::Hyphen => 24,
            ParaTextElement::BundleSpace => 30,
            ParaTextElement::FixedSpace => 31,
        }
    }

    fn from_control(code: u16) -> Option<Self> {
        Some(match code {
            2 => ParaTextElement::SectionColumnDef,
            3 => ParaTextElement::FieldStart,
            4 => ParaTextElement::FieldEnd,
            8 => ParaTextElement::TitleMark,
            9 => ParaTextElement::Tab,
            10 => ParaTextElement::LineBreak,
            11 => ParaTextElement::DrawingTable,
            13 => ParaTextElement::ParaBreak,
            15 => ParaTextElement::HiddenComment,
            16 => ParaTextElement::HeaderFooter,
            17 => ParaTextElement::FootnoteEndnote,
            18 => ParaTextElement::AutoNumber,
            21 => ParaTextElement::PageControl,
            22 => ParaTextElement::BookmarkIndex,
            23 => ParaTextElement::TextOverlap,
            24 => ParaTextElement::Hyphen,
            30 => ParaTextElement::BundleSpace,
            31 => ParaTextElement::FixedSpace,
            _ => return None,
        })
    }
}

/// Decode a PARA_TEXT payload into text runs and control markers.
///
/// A trailing odd byte is ignored; a parameter block cut short by the end of
/// the payload consumes whatever is left.
pub fn decode(data: &[u8]) -> Vec<ParaTextElement> {
    let mut elements = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut pos = 0;

    while pos + 2 <= data.len() {
        let code = u16::from_le_bytes([data[pos], data[pos + 1]]);
        if code >= 32 {
            run_start.get_or_insert(pos);
            pos += 2;
            continue;
        }

        if let Some(start) = run_start.take() {
            elements.push(ParaTextElement::Text(decode_run(&data[start..pos])));
        }
        pos += 2;

        if let Some(kind) = ControlKind::of(code) {
            pos = (pos + kind.param_size()).min(data.len());
            if let Some(element) = ParaTextElement::from_control(code) {
                elements.push(element);
            }
        }
    }

    if let Some(start) = run_start {
        elements.push(ParaTextElement::Text(decode_run(&data[start..pos])));
    }
    elements
}

fn decode_run(bytes: &[u8]) -> String {
    let (text, _) = UTF_16LE.decode_without_bom_handling(bytes);
    text.into_owned()
}
