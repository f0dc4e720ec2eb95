use crate::spreadsheet::cell::Cell;

/// A worksheet read from a workbook, holding its non-empty cells.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells, in (row, col) order once finished
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet, widening the data range.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|lower| row < lower).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|lower| col < lower).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|upper| upper < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Orders cells by position; worksheets normally store them that way already.
    pub(crate) fn finish(&mut self) {
        if !self.cells.windows(2).all(|pair| (pair[0].row, pair[0].col) < (pair[1].row, pair[1].col)) {
            self.cells.sort_by_key(|cell| (cell.row, cell.col));
            // A later cell at the same position overrides the earlier one.
            let mut deduplicated: Vec<Cell> = Vec::with_capacity(self.cells.len());
            for cell in self.cells.drain(..) {
                match deduplicated.last_mut() {
                    Some(last) if last.row == cell.row && last.col == cell.col => *last = cell,
                    _ => deduplicated.push(cell),
                }
            }
            self.cells = deduplicated;
        }
    }

    /// Returns every row that has at least one cell, as (row index, cells across the
    /// column range). Rows without cells are skipped.
    pub(crate) fn records(&self) -> Vec<(usize, Vec<Option<&Cell>>)> {
        let (Some(col_lower), Some(col_upper)) = (self.col_lower_bound, self.col_upper_bound) else {
            return Vec::new();
        };
        let width = col_upper - col_lower + 1;
        let mut records: Vec<(usize, Vec<Option<&Cell>>)> = Vec::new();
        for cell in &self.cells {
            let is_new_row = records.last().map(|(row, _)| *row != cell.row).unwrap_or(true);
            if is_new_row {
                records.push((cell.row, vec![None; width]));
            }
            if let Some((_, record)) = records.last_mut() {
                record[cell.col - col_lower] = Some(cell);
            }
        }
        records
    }
}
