//! Spreadsheet-like cell grid with cursor navigation and block paste.

use tracing::debug;

use crate::domain::editor::Key;

/// Zero-based cell coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Fixed-size rectangular grid of text cells.
///
/// The grid never grows on its own: paste and navigation are clipped to the
/// current bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<String>>,
    cols: usize,
    cursor: CellPos,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![vec![String::new(); cols]; rows],
            cols,
            cursor: CellPos::default(),
        }
    }

    /// Build from row data, padding or truncating every row to `cols`.
    pub fn from_rows(rows: Vec<Vec<String>>, cols: usize) -> Self {
        let cells = rows
            .into_iter()
            .map(|mut row| {
                row.resize(cols, String::new());
                row
            })
            .collect();
        Self {
            cells,
            cols,
            cursor: CellPos::default(),
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    /// Set one cell. Out-of-bounds writes are ignored and return `false`.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn cursor(&self) -> CellPos {
        self.cursor
    }

    pub fn set_cursor(&mut self, pos: CellPos) {
        self.cursor = CellPos {
            row: pos.row.min(self.rows().saturating_sub(1)),
            col: pos.col.min(self.cols.saturating_sub(1)),
        };
    }

    /// Move the cursor in response to a key.
    ///
    /// Arrows stay within bounds, Tab moves right and wraps to the start of
    /// the next row, Shift+Tab moves left and wraps back, Enter moves down.
    /// Keys without a navigation meaning leave the cursor alone.
    pub fn navigate(&mut self, key: Key) -> CellPos {
        if self.rows() == 0 || self.cols == 0 {
            return self.cursor;
        }
        let last_row = self.rows() - 1;
        let last_col = self.cols - 1;
        let CellPos { row, col } = self.cursor;

        self.cursor = match key {
            Key::Up => CellPos::new(row.saturating_sub(1), col),
            Key::Down | Key::Enter => CellPos::new((row + 1).min(last_row), col),
            Key::Left => CellPos::new(row, col.saturating_sub(1)),
            Key::Right => CellPos::new(row, (col + 1).min(last_col)),
            Key::Tab if col < last_col => CellPos::new(row, col + 1),
            Key::Tab if row < last_row => CellPos::new(row + 1, 0),
            Key::ShiftTab if col > 0 => CellPos::new(row, col - 1),
            Key::ShiftTab if row > 0 => CellPos::new(row - 1, last_col),
            _ => self.cursor,
        };
        self.cursor
    }

    /// Paste clipboard text as a block whose top-left corner is `(row, col)`.
    ///
    /// Values falling outside the grid are dropped. Returns the number of
    /// cells written.
    pub fn paste(&mut self, row: usize, col: usize, text: &str) -> usize {
        self.paste_cells(row, col, text).len()
    }

    /// Like [`Grid::paste`], returning the positions actually written in
    /// row-major order.
    pub fn paste_cells(&mut self, row: usize, col: usize, text: &str) -> Vec<CellPos> {
        let block = parse_clipboard(text);
        let mut written = Vec::new();
        for (dr, values) in block.into_iter().enumerate() {
            for (dc, value) in values.into_iter().enumerate() {
                let pos = CellPos::new(row + dr, col + dc);
                if self.set(pos.row, pos.col, value) {
                    written.push(pos);
                }
            }
        }
        debug!("paste at ({}, {}): wrote {} cells", row, col, written.len());
        written
    }

    pub fn paste_at_cursor(&mut self, text: &str) -> usize {
        let CellPos { row, col } = self.cursor;
        self.paste(row, col, text)
    }

}

/// Split clipboard text into rows of values.
///
/// Tab-delimited when the text contains a tab (spreadsheet copy), otherwise
/// comma-delimited. Double quotes group a value that contains delimiters or
/// line breaks. Blank lines are skipped.
pub fn parse_clipboard(text: &str) -> Vec<Vec<String>> {
    let delimiter = if text.contains('\t') { b'\t' } else { b',' };
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes())
        .records()
        .filter_map(Result::ok)
        .map(|record| record.iter().map(str::to_string).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paste_two_by_two_into_three_by_three() {
        let mut grid = Grid::new(3, 3);
        for r in 0..3 {
            for c in 0..3 {
                grid.set(r, c, format!("{r}{c}"));
            }
        }

        let written = grid.paste(0, 0, "a\tb\nc\td\n");

        assert_eq!(written, 4);
        assert_eq!(grid.cell(0, 0), Some("a"));
        assert_eq!(grid.cell(0, 1), Some("b"));
        assert_eq!(grid.cell(1, 0), Some("c"));
        assert_eq!(grid.cell(1, 1), Some("d"));
        for (r, c) in [(0, 2), (1, 2), (2, 0), (2, 1), (2, 2)] {
            assert_eq!(grid.cell(r, c), Some(format!("{r}{c}").as_str()));
        }
    }

    #[test]
    fn test_paste_is_clipped_to_bounds() {
        let mut grid = Grid::new(2, 2);
        let written = grid.paste(1, 1, "x,y,z\nu,v,w");
        assert_eq!(written, 1);
        assert_eq!(grid.cell(1, 1), Some("x"));
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 2);
    }

    #[test]
    fn test_paste_outside_grid_writes_nothing() {
        let mut grid = Grid::new(2, 2);
        assert_eq!(grid.paste(5, 0, "a"), 0);
    }

    #[test]
    fn test_parse_clipboard_respects_quotes_and_crlf() {
        let rows = parse_clipboard("\"Smith, J\",P0\r\nLee,P1\r\n");
        assert_eq!(
            rows,
            vec![
                vec!["Smith, J".to_string(), "P0".to_string()],
                vec!["Lee".to_string(), "P1".to_string()],
            ]
        );
    }

    #[test]
    fn test_tab_wraps_to_next_row() {
        let mut grid = Grid::new(2, 2);
        grid.set_cursor(CellPos::new(0, 1));
        assert_eq!(grid.navigate(Key::Tab), CellPos::new(1, 0));
        assert_eq!(grid.navigate(Key::ShiftTab), CellPos::new(0, 1));
    }

    #[test]
    fn test_arrows_clamp_at_edges() {
        let mut grid = Grid::new(2, 2);
        assert_eq!(grid.navigate(Key::Up), CellPos::new(0, 0));
        assert_eq!(grid.navigate(Key::Left), CellPos::new(0, 0));
        grid.navigate(Key::Enter);
        grid.navigate(Key::Right);
        assert_eq!(grid.navigate(Key::Down), CellPos::new(1, 1));
        assert_eq!(grid.navigate(Key::Right), CellPos::new(1, 1));
    }

    #[test]
    fn test_paste_at_cursor() {
        let mut grid = Grid::new(3, 3);
        grid.set_cursor(CellPos::new(2, 1));
        assert_eq!(grid.paste_at_cursor("p\tq"), 2);
        assert_eq!(grid.cell(2, 2), Some("q"));
    }

    #[test]
    fn test_paste_cells_reports_only_written_positions() {
        let mut grid = Grid::new(2, 3);
        let cells = grid.paste_cells(1, 1, "a,b,c
d");
        assert_eq!(cells, vec![CellPos::new(1, 1), CellPos::new(1, 2)]);
    }
}
