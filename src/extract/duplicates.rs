use crate::error::ExtractError;
use crate::extract::matcher::to_key;
use crate::table::Table;
use std::collections::HashMap;

/// Keeps every row whose key occurs at least twice, in original order.
pub fn split_duplicates(matches: &Table, key_column: &str) -> Result<Table, ExtractError> {
    let key = matches
        .column_index(key_column)
        .ok_or_else(|| ExtractError::Schema { column: key_column.to_owned() })?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in matches.rows() {
        *counts.entry(to_key(&row[key])).or_insert(0) += 1;
    }
    let rows = matches
        .rows()
        .iter()
        .filter(|row| counts.get(to_key(&row[key])).copied().unwrap_or(0) >= 2)
        .cloned()
        .collect();
    Ok(Table::new(matches.columns().to_vec(), rows))
}
