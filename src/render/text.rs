//! Plain-text output of a content stream.

use std::io::Write;

use log::warn;

use super::config::TextOptions;
use super::table::{LayoutCell, TableLayout};
use crate::common::Result;
use crate::document::{ContentNode, ContentSource, Table};

/// Writes content nodes as plain text with ASCII tables.
///
/// # Examples
///
/// ```rust
/// use hwptext::document::{Cell, ContentNode, Paragraph, Table};
/// use hwptext::render::{TextOptions, TextRenderer};
///
/// let mut table = Table::new(1, 2);
/// table.push_cell(Cell::new(0, 0).with_text("a"));
/// table.push_cell(Cell::new(0, 1).with_text("b"));
///
/// let mut out = Vec::new();
/// let mut renderer = TextRenderer::new(&mut out, TextOptions::default());
/// renderer.render_node(&ContentNode::Paragraph(Paragraph::new("Title")))?;
/// renderer.render_node(&ContentNode::Table(table))?;
///
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "Title\n+---+---+\n| a | b |\n+---+---+\n\n"
/// );
/// # Ok::<(), hwptext::Error>(())
/// ```
pub struct TextRenderer<W: Write> {
    out: W,
    options: TextOptions,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, options: TextOptions) -> Self {
        Self { out, options }
    }

    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    /// Write one node.
    pub fn render_node(&mut self, node: &ContentNode) -> Result<()> {
        match node {
            ContentNode::Paragraph(paragraph) => {
                writeln!(self.out, "{}", paragraph.text.trim_end_matches('\n'))?;
            },
            ContentNode::Table(table) => self.render_table(table)?,
            ContentNode::Image(_) => {
                writeln!(self.out, "{}", self.options.image_placeholder)?;
            },
        }
        Ok(())
    }

    /// Drain `source`, writing every node. Stops at the first error.
    pub fn render_all<S: ContentSource>(&mut self, mut source: S) -> Result<()> {
        while let Some(node) = source.next_node()? {
            self.render_node(&node)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn render_table(&mut self, table: &Table) -> Result<()> {
        if table.is_empty() {
            warn!(
                "dropping empty table ({}x{}, {} cells)",
                table.rows,
                table.cols,
                table.cells.len()
            );
            return Ok(());
        }

        let trim = self.options.trim_cell_text;
        let cells: Vec<LayoutCell<'_>> = table
            .cells
            .iter()
            .map(|cell| LayoutCell {
                row: cell.row,
                col: cell.col,
                row_span: cell.row_span,
                col_span: cell.col_span,
                text: if trim { cell.text.trim() } else { &cell.text },
            })
            .collect();

        let rendered = TableLayout::new(table.rows, table.cols, &cells).render();
        self.out.write_all(rendered.as_bytes())?;
        if self.options.blank_line_after_table {
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render a whole content source into a string.
pub fn render_to_string<S: ContentSource>(source: S, options: &TextOptions) -> Result<String> {
    let mut renderer = TextRenderer::new(Vec::new(), options.clone());
    renderer.render_all(source)?;
    Ok(String::from_utf8_lossy(&renderer.into_inner()).into_owned())
}
