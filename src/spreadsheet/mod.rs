//! # Spreadsheet Module
//!
//! Reads Office Open XML workbooks (.xlsx, .xlsm, .xlam) into sheets of typed
//! cells and writes single-sheet result workbooks.

pub(crate) mod cell;
pub(crate) mod criteria;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod writer;
pub(crate) mod xlsx;

use crate::error::SheetError;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;

/// Errors raised while interpreting workbook contents.
#[derive(Error, Debug)]
pub(crate) enum SpreadsheetError {
    #[error("Part '{0}' is missing from the workbook")]
    FileError(String),

    #[error("Workbook '{0}' has no sheets")]
    SpreadsheetEmptyError(String),

    #[error("Unsupported file format '{0}', expected .xlsx, .xlsm or .xlam")]
    UnsupportedFormatError(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFoundError(String),

    #[error("Shared string #{0} not found")]
    SharedStringError(usize),
}

/// A workbook opened for reading.
pub(crate) trait Spreadsheet {
    /// File name of the workbook
    fn name(&self) -> String;

    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads the sheets accepted by the criteria, in workbook order
    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, SheetError>;
}

/// Opens a workbook, choosing the reader by file extension.
pub(crate) fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, SheetError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlam" => Ok(Box::new(XlsxSpreadsheet::open(path)?)),
        _ => Err(SpreadsheetError::UnsupportedFormatError(path.display().to_string()))?,
    }
}
