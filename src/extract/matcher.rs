use crate::error::ExtractError;
use crate::extract::selection::OutputSelection;
use crate::table::Table;
use std::collections::HashSet;

/// Coerces a cell to the text used for key comparison.
///
/// Cells are loaded as text, so keys compare exactly: `"007"` never equals `"7"`.
/// Both sides of the comparison go through here.
pub(crate) fn to_key(value: &str) -> &str {
    value
}

/// Collects the codes of the lookup table's first column. Blank codes are skipped.
pub fn lookup_codes(lookup: &Table) -> HashSet<String> {
    let mut blanks = 0usize;
    let codes: HashSet<String> = lookup
        .rows()
        .iter()
        .filter_map(|row| row.first())
        .map(|value| to_key(value))
        .filter(|code| {
            let is_blank = code.is_empty();
            blanks += usize::from(is_blank);
            !is_blank
        })
        .map(str::to_owned)
        .collect();
    if blanks > 0 {
        log::warn!("Skipped {} blank lookup codes", blanks);
    }
    codes
}

fn column_position(table: &Table, column: &str) -> Result<usize, ExtractError> {
    table
        .column_index(column)
        .ok_or_else(|| ExtractError::Schema { column: column.to_owned() })
}

/// Keeps the database rows whose key is one of the lookup codes, in their
/// original order, projected onto the selected columns.
pub fn extract_matches(
    database: &Table,
    lookup: &Table,
    selection: &OutputSelection,
) -> Result<Table, ExtractError> {
    let positions = selection
        .columns()
        .iter()
        .map(|column| column_position(database, column))
        .collect::<Result<Vec<usize>, ExtractError>>()?;
    let key = positions[0];
    let codes = lookup_codes(lookup);

    let rows = database
        .rows()
        .iter()
        .filter(|row| codes.contains(to_key(&row[key])))
        .map(|row| positions.iter().map(|position| row[*position].to_owned()).collect())
        .collect();
    Ok(Table::new(selection.columns().to_vec(), rows))
}
