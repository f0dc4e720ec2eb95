//! In-memory tables of text cells.

pub(crate) mod loader;

use crate::spreadsheet::sheet::Sheet;
use std::collections::HashMap;
use std::collections::HashSet;

/// Ordered rows of text cells aligned with a list of unique column names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table; short rows are padded with empty cells and long rows truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Builds a table from one worksheet.
    ///
    /// The first row holding any cell is the header. Header cells without text
    /// are named `Unnamed: <index>` and repeated names get `.1`, `.2` suffixes.
    /// The index counts from the sheet's first used column, not from column A.
    pub(crate) fn from_sheet(sheet: &Sheet) -> Self {
        let mut records = sheet.records().into_iter();
        let Some((header_row, header)) = records.next() else {
            log::debug!("Sheet '{}' of '{}' is empty", sheet.name, sheet.file_name);
            return Table::default();
        };
        log::debug!("Sheet '{}' of '{}': header on row {}", sheet.name, sheet.file_name, header_row + 1);

        let names = header
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                cell.map(|cell| cell.to_text())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| format!("Unnamed: {index}"))
            })
            .collect();
        let columns = to_unique_names(names);

        let rows = records
            .map(|(_, record)| {
                record
                    .iter()
                    .map(|cell| cell.map(|cell| cell.to_text()).unwrap_or_default())
                    .collect::<Vec<String>>()
            })
            .filter(|row| row.iter().any(|value| !value.is_empty()))
            .collect();
        Table { columns, rows }
    }

    /// Stacks tables in order; the columns are the union in first-seen order.
    pub(crate) fn concat(tables: Vec<Table>) -> Self {
        let mut tables = tables.into_iter();
        let Some(mut result) = tables.next() else {
            return Table::default();
        };

        for table in tables {
            let positions: Vec<usize> = table
                .columns
                .iter()
                .map(|column| match result.column_index(column) {
                    Some(position) => position,
                    None => {
                        result.columns.push(column.to_owned());
                        result.columns.len() - 1
                    }
                })
                .collect();
            let width = result.columns.len();
            for row in result.rows.iter_mut() {
                row.resize(width, String::new());
            }
            for row in table.rows {
                let mut aligned = vec![String::new(); width];
                for (value, position) in row.into_iter().zip(&positions) {
                    aligned[*position] = value;
                }
                result.rows.push(aligned);
            }
        }
        result
    }
}

/// Suffixes repeated names with `.1`, `.2`, ... skipping names already taken.
fn to_unique_names(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        if seen.insert(name.to_owned()) {
            unique.push(name);
            continue;
        }
        let counter = counters.entry(name.to_owned()).or_insert(0);
        let renamed = loop {
            *counter += 1;
            let candidate = format!("{name}.{counter}");
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        taken.insert(renamed.to_owned());
        seen.insert(renamed.to_owned());
        unique.push(renamed);
    }
    unique
}
