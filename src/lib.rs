//! # Lending Code Extractor
//!
//! Cross-references a database workbook with a workbook of lookup codes. Rows of
//! the database whose key column holds one of the codes are written to
//! `抽出結果_<YYYYMMDD>.xlsx`, and rows whose key occurs more than once among them
//! to `重複結果_<YYYYMMDD>.xlsx`.
//!
//! ## Pipeline
//!
//! - **Load**: read the selected sheets of an `.xlsx`, `.xlsm` or `.xlam` file
//!   into a [`Table`] of text cells ([`load_table`], [`list_sheets`])
//! - **Match**: keep database rows whose key is in the lookup's first column and
//!   project them onto the chosen columns, key first ([`extract_matches`])
//! - **Split**: keep every row whose key repeats ([`split_duplicates`])
//! - **Write**: store both results as single-sheet workbooks ([`execute`])
//!
//! Keys always compare as text, so `"007"` and `"7"` are different codes.

mod config;
mod error;
mod extract;
mod helpers;
mod session;
mod spreadsheet;
mod table;

pub mod cli;
pub mod shell;
pub mod worker;

pub use crate::config::ConfigError;
pub use crate::config::Settings;
pub use crate::config::MAX_OUTPUT_COLUMNS;
pub use crate::error::ExtractError;
pub use crate::error::MissingPrerequisites;
pub use crate::error::Prerequisite;
pub use crate::extract::duplicates::split_duplicates;
pub use crate::extract::matcher::extract_matches;
pub use crate::extract::matcher::lookup_codes;
pub use crate::extract::run::check_prerequisites;
pub use crate::extract::run::execute;
pub use crate::extract::run::result_file_name;
pub use crate::extract::run::write_table;
pub use crate::extract::run::RunReport;
pub use crate::extract::run::RunRequest;
pub use crate::extract::run::DUPLICATE_PREFIX;
pub use crate::extract::run::OUTPUT_PREFIX;
pub use crate::extract::selection::OutputSelection;
pub use crate::session::LoadedTable;
pub use crate::session::Session;
pub use crate::session::SessionError;
pub use crate::spreadsheet::criteria::Criteria;
pub use crate::spreadsheet::criteria::SheetSelector;
pub use crate::table::loader::list_sheets;
pub use crate::table::loader::load_table;
pub use crate::table::Table;
