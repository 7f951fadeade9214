//! Content assembly from the flat record stream.
//!
//! Section records carry no explicit nesting, only a level per record. The
//! scanner rebuilds paragraphs, tables and drawing-object placeholders from
//! them with a small state machine and a single record of lookahead.

use std::io::Read;

use log::{debug, trace};

use super::package::HwpPackage;
use super::para_text::ParaTextElement;
use super::record::{CtrlId, Record, RecordBody, RecordReader};
use crate::common::Result;
use crate::document::{Cell, ContentNode, ContentSource, Image, Paragraph, Table};
use crate::ole::StreamStorage;

/// Table being assembled.
struct TableBuilder {
    /// Level of the table control; a record at or below it ends the table
    start_level: u16,
    table: Table,
    /// Index of the cell receiving paragraph text
    active_cell: Option<usize>,
}

impl TableBuilder {
    fn active_cell(&mut self) -> Option<&mut Cell> {
        self.active_cell.and_then(|i| self.table.cells.get_mut(i))
    }
}

/// Pull-based scanner over every section of an [`HwpPackage`].
///
/// Sections are read in order and their boundaries are invisible to the
/// caller. Once an error is returned the scanner reports end of content.
///
/// A table still being collected when a decode error occurs is discarded:
/// the error is returned in its place and the cells read so far are lost.
pub struct HwpContentScanner<'a, S: StreamStorage> {
    package: &'a mut HwpPackage<S>,
    next_section: usize,
    records: Option<RecordReader<Box<dyn Read>>>,
    pending: Option<Record>,
    paragraph: Option<String>,
    table: Option<TableBuilder>,
    table_level: u16,
    finished: bool,
}

impl<'a, S: StreamStorage> HwpContentScanner<'a, S> {
    pub(crate) fn new(package: &'a mut HwpPackage<S>) -> Self {
        Self {
            package,
            next_section: 0,
            records: None,
            pending: None,
            paragraph: None,
            table: None,
            table_level: 0,
            finished: false,
        }
    }

    /// Next record across section boundaries, honouring the pushback slot.
    fn next_record(&mut self) -> Result<Option<Record>> {
        if let Some(record) = self.pending.take() {
            return Ok(Some(record));
        }

        loop {
            if self.records.is_none() {
                if self.next_section >= self.package.section_count() {
                    return Ok(None);
                }
                let stream = self.package.open_section(self.next_section)?;
                self.next_section += 1;
                self.records = Some(RecordReader::new(stream));
            }

            let Some(records) = self.records.as_mut() else {
                continue;
            };
            match records.next_record()? {
                Some(record) => return Ok(Some(record)),
                None => {
                    trace!("end of section {}", self.next_section - 1);
                    self.records = None;
                },
            }
        }
    }

    fn push_back(&mut self, record: Record) {
        self.pending = Some(record);
    }

    /// Skip every record nested deeper than `level`.
    fn skip_children(&mut self, level: u16) -> Result<()> {
        while let Some(record) = self.next_record()? {
            if record.level() <= level {
                self.push_back(record);
                break;
            }
        }
        Ok(())
    }

    fn finish_table(&mut self) -> Option<ContentNode> {
        let builder = self.table.take()?;
        debug!(
            "table {}x{} with {} cells",
            builder.table.rows,
            builder.table.cols,
            builder.table.cells.len()
        );
        Some(ContentNode::Table(builder.table))
    }

    fn scan(&mut self) -> Result<Option<ContentNode>> {
        loop {
            let Some(record) = self.next_record()? else {
                return Ok(self.finish_table());
            };

            if let Some(builder) = &self.table {
                if record.level() <= builder.start_level {
                    self.push_back(record);
                    return Ok(self.finish_table());
                }
            }

            let level = record.level();
            match record.body {
                RecordBody::ParaHeader => {
                    self.paragraph = Some(String::new());
                },
                RecordBody::ParaText(elements) => {
                    if let Some(text) = self.paragraph.as_mut() {
                        for element in elements {
                            match element {
                                ParaTextElement::Text(run) => text.push_str(&run),
                                ParaTextElement::LineBreak => text.push('\n'),
                                ParaTextElement::Tab => text.push('\t'),
                                _ => {},
                            }
                        }
                    }
                },
                RecordBody::ParaCharShape | RecordBody::ParaLineSeg => {
                    if let Some(text) = self.paragraph.take() {
                        match self.table.as_mut().and_then(TableBuilder::active_cell) {
                            Some(cell) => cell.append_paragraph(&text),
                            None => return Ok(Some(ContentNode::Paragraph(Paragraph { text }))),
                        }
                    }
                },
                RecordBody::CtrlHeader { ctrl_id, .. } => match ctrl_id {
                    CtrlId::TABLE => self.table_level = level,
                    CtrlId::DRAWING_OBJECT => {
                        self.skip_children(level)?;
                        return Ok(Some(ContentNode::Image(Image)));
                    },
                    other => {
                        trace!("skipping control '{}' at level {}", other, level);
                        self.skip_children(level)?;
                    },
                },
                RecordBody::Table(info) => {
                    if self.table.is_none() {
                        self.table = Some(TableBuilder {
                            start_level: self.table_level,
                            table: Table::new(info.rows as usize, info.cols as usize),
                            active_cell: None,
                        });
                    }
                },
                RecordBody::ListHeader(list) => {
                    if let (Some(builder), Some(address)) = (self.table.as_mut(), list.cell) {
                        builder.table.push_cell(
                            Cell::new(address.row as usize, address.col as usize)
                                .with_span(address.row_span as usize, address.col_span as usize),
                        );
                        builder.active_cell = Some(builder.table.cells.len() - 1);
                    }
                },
                _ => {},
            }
        }
    }
}

impl<S: StreamStorage> ContentSource for HwpContentScanner<'_, S> {
    fn next_node(&mut self) -> Result<Option<ContentNode>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.scan();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
            self.records = None;
            self.pending = None;
        }
        result
    }
}

impl<S: StreamStorage> Iterator for HwpContentScanner<'_, S> {
    type Item = Result<ContentNode>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node().transpose()
    }
}
