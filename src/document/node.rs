//! Content nodes produced by a document decoder.

/// One top-level piece of document content, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    Paragraph(Paragraph),
    Table(Table),
    /// Drawing object or picture; only its position is kept
    Image(Image),
}

/// A paragraph of text. Line breaks are `\n`, tabs are `\t`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A table with its declared bounds and the cells in document order.
///
/// Bounds always cover every cell's `row + row_span` and `col + col_span`
/// when built by the HWP scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Cell>,
}

impl Table {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: Vec::new(),
        }
    }

    /// Add a cell, growing the bounds so it fits.
    pub fn push_cell(&mut self, cell: Cell) {
        self.rows = self.rows.max(cell.row + cell.row_span);
        self.cols = self.cols.max(cell.col + cell.col_span);
        self.cells.push(cell);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() || self.rows == 0 || self.cols == 0
    }
}

/// A table cell. Spans are at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    /// Paragraphs of the cell joined by `\n`
    pub text: String,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
            text: String::new(),
        }
    }

    pub fn with_span(mut self, row_span: usize, col_span: usize) -> Self {
        self.row_span = row_span.max(1);
        self.col_span = col_span.max(1);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a paragraph, separating it from earlier ones with a newline.
    pub fn append_paragraph(&mut self, text: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(text);
    }
}

/// Placeholder for an embedded drawing object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Image;

impl From<Paragraph> for ContentNode {
    fn from(p: Paragraph) -> Self {
        ContentNode::Paragraph(p)
    }
}

impl From<Table> for ContentNode {
    fn from(t: Table) -> Self {
        ContentNode::Table(t)
    }
}

impl From<Image> for ContentNode {
    fn from(i: Image) -> Self {
        ContentNode::Image(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_cell_grows_bounds() {
        let mut table = Table::new(1, 1);
        table.push_cell(Cell::new(2, 0).with_span(1, 3));
        assert_eq!(table.rows, 3);
        assert_eq!(table.cols, 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_append_paragraph() {
        let mut cell = Cell::new(0, 0);
        cell.append_paragraph("a");
        cell.append_paragraph("");
        cell.append_paragraph("b");
        assert_eq!(cell.text, "a\n\nb");
    }

    #[test]
    fn test_zero_span_clamped() {
        let cell = Cell::new(0, 0).with_span(0, 0);
        assert_eq!((cell.row_span, cell.col_span), (1, 1));
    }
}
