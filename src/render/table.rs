//! ASCII table layout.
//!
//! Layout is computed once from the cell list and then rendered line by line.
//! A grid maps every (row, col) position to the index of the cell that covers
//! it, so merged regions are detected by comparing owners rather than text.
//!
//! ```text
//! +-----+---+
//! | Wide    |
//! +-----+---+
//! | A   | B |
//! +-----+---+
//! ```

use unicode_width::UnicodeWidthStr;

/// Terminal column width of `s`.
///
/// East Asian wide characters count 2, combining marks and control
/// characters count 0.
///
/// # Examples
///
/// ```
/// use hwptext::render::display_width;
///
/// assert_eq!(display_width("abc"), 3);
/// assert_eq!(display_width("한글"), 4);
/// assert_eq!(display_width("e\u{301}"), 1);
/// ```
pub fn display_width(s: &str) -> usize {
    if s.chars().any(char::is_control) {
        s.chars()
            .filter(|c| !c.is_control())
            .collect::<String>()
            .width()
    } else {
        s.width()
    }
}

/// A cell as seen by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCell<'a> {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub text: &'a str,
}

/// Computed geometry of a table, ready to render.
#[derive(Debug, Clone)]
pub struct TableLayout<'a> {
    rows: usize,
    cols: usize,
    cells: Vec<LayoutCell<'a>>,
    /// Owner cell index per grid position, row-major
    owners: Vec<Option<usize>>,
    lines: Vec<Vec<&'a str>>,
    col_widths: Vec<usize>,
    row_heights: Vec<usize>,
}

impl<'a> TableLayout<'a> {
    /// Lay out `cells` on a `rows` x `cols` grid.
    ///
    /// Cells whose origin falls outside the grid are ignored; spans running
    /// past the edge are clipped.
    pub fn new(rows: usize, cols: usize, cells: &[LayoutCell<'a>]) -> Self {
        let cells: Vec<LayoutCell<'a>> = cells
            .iter()
            .filter(|c| c.row < rows && c.col < cols)
            .map(|c| LayoutCell {
                row_span: c.row_span.clamp(1, rows - c.row),
                col_span: c.col_span.clamp(1, cols - c.col),
                ..*c
            })
            .collect();

        let mut owners = vec![None; rows * cols];
        for (index, cell) in cells.iter().enumerate() {
            for r in cell.row..cell.row + cell.row_span {
                for c in cell.col..cell.col + cell.col_span {
                    owners[r * cols + c] = Some(index);
                }
            }
        }

        let lines = cells.iter().map(|c| c.text.split('\n').collect()).collect();

        let mut layout = Self {
            rows,
            cols,
            cells,
            owners,
            lines,
            col_widths: vec![1; cols],
            row_heights: vec![1; rows],
        };
        layout.compute_col_widths();
        layout.compute_row_heights();
        layout
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Content width of each column, excluding padding and borders.
    pub fn col_widths(&self) -> &[usize] {
        &self.col_widths
    }

    /// Number of text lines in each row.
    pub fn row_heights(&self) -> &[usize] {
        &self.row_heights
    }

    fn owner(&self, row: usize, col: usize) -> Option<usize> {
        self.owners[row * self.cols + col]
    }

    fn max_line_width(&self, index: usize) -> usize {
        self.lines[index]
            .iter()
            .map(|line| display_width(line))
            .max()
            .unwrap_or(0)
    }

    fn compute_col_widths(&mut self) {
        for index in 0..self.cells.len() {
            let cell = self.cells[index];
            if cell.col_span == 1 {
                let width = self.max_line_width(index);
                let current = &mut self.col_widths[cell.col];
                *current = (*current).max(width);
            }
        }

        // Spanning cells widen their columns only when the single-column
        // widths are not enough. The remainder goes to the leftmost columns.
        for index in 0..self.cells.len() {
            let cell = self.cells[index];
            if cell.col_span < 2 {
                continue;
            }
            let required = self.max_line_width(index);
            let span = cell.col..cell.col + cell.col_span;
            let total: usize = self.col_widths[span.clone()].iter().sum();
            if required > total {
                let extra = required - total;
                let per_col = extra / cell.col_span;
                let remainder = extra % cell.col_span;
                for (i, width) in self.col_widths[span].iter_mut().enumerate() {
                    *width += per_col + usize::from(i < remainder);
                }
            }
        }
    }

    fn compute_row_heights(&mut self) {
        for (index, cell) in self.cells.iter().enumerate() {
            let height = &mut self.row_heights[cell.row];
            *height = (*height).max(self.lines[index].len());
        }
    }

    /// Render the table. Every line, including the last, ends with `\n`.
    ///
    /// An empty grid renders as an empty string.
    pub fn render(&self) -> String {
        if self.rows == 0 || self.cols == 0 {
            return String::new();
        }

        let mut out = String::new();
        self.push_border(&mut out, None);
        for row in 0..self.rows {
            for line in 0..self.row_heights[row] {
                self.push_content_line(&mut out, row, line);
            }
            self.push_border(&mut out, Some(row));
        }
        out
    }

    /// Border below `row`, or the top border for `None`.
    fn push_border(&self, out: &mut String, row: Option<usize>) {
        out.push('+');
        for col in 0..self.cols {
            let fill = if self.needs_horizontal(row, col) { '-' } else { ' ' };
            out.extend(std::iter::repeat_n(fill, self.col_widths[col] + 2));

            if col + 1 < self.cols {
                out.push(if self.needs_vertical(row, col) { '+' } else { '-' });
            }
        }
        out.push_str("+\n");
    }

    /// Row above an interior border; `None` for the top and bottom borders.
    fn inner_border_row(&self, row: Option<usize>) -> Option<usize> {
        match row {
            Some(r) if r + 1 < self.rows => Some(r),
            _ => None,
        }
    }

    fn needs_horizontal(&self, row: Option<usize>, col: usize) -> bool {
        match self.inner_border_row(row) {
            None => true,
            Some(r) => self.owner(r, col) != self.owner(r + 1, col),
        }
    }

    /// Whether a `+` joint sits between `col` and `col + 1` on this border.
    fn needs_vertical(&self, row: Option<usize>, col: usize) -> bool {
        match self.inner_border_row(row) {
            None => true,
            Some(r) => {
                self.owner(r, col) != self.owner(r, col + 1)
                    || self.owner(r + 1, col) != self.owner(r + 1, col + 1)
            },
        }
    }

    fn push_content_line(&self, out: &mut String, row: usize, line: usize) {
        out.push('|');
        let mut col = 0;
        while col < self.cols {
            let Some(index) = self.owner(row, col) else {
                col += 1;
                continue;
            };
            let cell = &self.cells[index];
            if cell.col != col {
                col += 1;
                continue;
            }

            let width: usize = self.col_widths[col..col + cell.col_span].iter().sum::<usize>()
                + 3 * (cell.col_span - 1);
            let text = if cell.row == row {
                self.lines[index].get(line).copied().unwrap_or("")
            } else {
                ""
            };

            out.push(' ');
            out.push_str(text);
            out.extend(std::iter::repeat_n(' ', width.saturating_sub(display_width(text))));
            out.push(' ');

            col += cell.col_span;
            if col < self.cols {
                out.push('|');
            }
        }
        out.push_str("|\n");
    }
}
