use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Low-level error raised while reading or writing workbook files.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub(crate) enum SheetError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SheetError::WithContextError(format!("{}: {}", message, e)))
    }
}

/// A prerequisite of an extraction run that has not been satisfied yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Prerequisite {
    Database,
    Lookup,
    KeyColumn,
}

impl Display for Prerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Prerequisite::Database => "database missing",
            Prerequisite::Lookup => "lookup missing",
            Prerequisite::KeyColumn => "key column missing",
        };
        write!(f, "{}", text)
    }
}

/// Every prerequisite found missing while validating a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MissingPrerequisites(pub Vec<Prerequisite>);

impl MissingPrerequisites {
    pub fn contains(&self, prerequisite: Prerequisite) -> bool {
        self.0.contains(&prerequisite)
    }
}

impl Display for MissingPrerequisites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", items.join(", "))
    }
}

/// Errors surfaced to the user by loading and extraction operations.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Source workbook is missing, unreadable, corrupt or unsupported.
    #[error("Load '{}' failed: {cause}", .path.display())]
    Load { path: PathBuf, cause: String },

    /// Extraction was requested before everything it needs was in place.
    #[error("Cannot extract: {0}")]
    Precondition(MissingPrerequisites),

    /// A requested column does not exist in the database table.
    #[error("Column '{column}' does not exist in the database table")]
    Schema { column: String },

    /// Result workbook could not be written.
    #[error("Write '{}' failed: {cause}", .path.display())]
    Write { path: PathBuf, cause: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_names_every_missing_item() {
        let error = ExtractError::Precondition(MissingPrerequisites(vec![
            Prerequisite::Database,
            Prerequisite::Lookup,
            Prerequisite::KeyColumn,
        ]));
        assert_eq!(
            error.to_string(),
            "Cannot extract: database missing, lookup missing, key column missing"
        );
    }

    #[test]
    fn with_prefix_keeps_cause() {
        let result: Result<(), SheetError> = Err(SheetError::WithContextError("bad zip".to_owned()));
        let error = result.with_prefix("book.xlsx").unwrap_err();
        assert_eq!(error.to_string(), "book.xlsx: bad zip");
    }
}
