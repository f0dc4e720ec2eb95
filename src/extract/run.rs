use crate::error::ExtractError;
use crate::error::MissingPrerequisites;
use crate::error::Prerequisite;
use crate::extract::duplicates::split_duplicates;
use crate::extract::matcher::extract_matches;
use crate::extract::selection::OutputSelection;
use crate::spreadsheet::writer::write_workbook;
use crate::table::Table;
use chrono::Local;
use chrono::NaiveDate;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

/// File name prefix of the matched rows workbook
pub const OUTPUT_PREFIX: &str = "抽出結果";
/// File name prefix of the duplicated rows workbook
pub const DUPLICATE_PREFIX: &str = "重複結果";

/// Everything one extraction run needs, captured when the run is requested.
#[derive(Clone, Debug)]
pub struct RunRequest {
    pub database: Option<Arc<Table>>,
    pub lookup: Option<Arc<Table>>,
    pub key_column: Option<String>,
    /// Chosen output columns in slot order
    pub columns: Vec<String>,
    pub output_dir: PathBuf,
    pub duplicate_dir: PathBuf,
    /// Date embedded in the output file names
    pub date: NaiveDate,
}

impl RunRequest {
    /// Creates a request dated today with both directories set to `directory`.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        let directory = directory.into();
        RunRequest {
            database: None,
            lookup: None,
            key_column: None,
            columns: Vec::new(),
            output_dir: directory.to_owned(),
            duplicate_dir: directory,
            date: Local::now().date_naive(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub matched_rows: usize,
    pub output_path: PathBuf,
    pub duplicate_rows: usize,
    /// Set only when duplicates were found and written
    pub duplicate_path: Option<PathBuf>,
}

impl Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} matched rows written to {}", self.matched_rows, self.output_path.display())?;
        match &self.duplicate_path {
            Some(path) => write!(f, "\n{} duplicated rows written to {}", self.duplicate_rows, path.display()),
            None => write!(f, "\nNo duplicated keys"),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum RunState {
    Validating,
    Matching,
    WritingPrimary,
    WritingDuplicates,
    Reporting,
}

fn enter(state: RunState) {
    log::debug!("Extraction run: {:?}", state);
}

/// Builds a dated result file name such as `抽出結果_20240401.xlsx`.
pub fn result_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.xlsx", prefix, date.format("%Y%m%d"))
}

/// Checks that the database, the lookup and the key column are all present.
pub fn check_prerequisites(request: &RunRequest) -> Result<(), ExtractError> {
    let mut missing = Vec::new();
    if request.database.is_none() {
        missing.push(Prerequisite::Database);
    }
    if request.lookup.is_none() {
        missing.push(Prerequisite::Lookup);
    }
    if request.key_column.as_deref().map(str::is_empty).unwrap_or(true) {
        missing.push(Prerequisite::KeyColumn);
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ExtractError::Precondition(MissingPrerequisites(missing)))
    }
}

/// Writes a table as a single-sheet workbook, header row first.
pub fn write_table(path: &Path, table: &Table) -> Result<(), ExtractError> {
    write_workbook(path, table.columns(), table.rows()).map_err(|error| ExtractError::Write {
        path: path.to_path_buf(),
        cause: error.to_string(),
    })
}

/// Runs one extraction: match, split duplicates and write the result workbooks.
///
/// Nothing is written unless every prerequisite is present and every selected
/// column exists.
pub fn execute(request: &RunRequest) -> Result<RunReport, ExtractError> {
    enter(RunState::Validating);
    check_prerequisites(request)?;
    let (Some(database), Some(lookup), Some(key_column)) =
        (&request.database, &request.lookup, &request.key_column)
    else {
        return Err(ExtractError::Precondition(MissingPrerequisites::default()));
    };

    enter(RunState::Matching);
    let selection = OutputSelection::new(key_column, &request.columns);
    let matches = extract_matches(database, lookup, &selection)?;
    let duplicates = split_duplicates(&matches, key_column)?;

    enter(RunState::WritingPrimary);
    let output_path = request.output_dir.join(result_file_name(OUTPUT_PREFIX, request.date));
    write_table(&output_path, &matches)?;
    log::info!("Wrote {} matched rows to '{}'", matches.len(), output_path.display());

    let duplicate_path = if duplicates.is_empty() {
        None
    } else {
        enter(RunState::WritingDuplicates);
        let path = request.duplicate_dir.join(result_file_name(DUPLICATE_PREFIX, request.date));
        write_table(&path, &duplicates)?;
        log::info!("Wrote {} duplicated rows to '{}'", duplicates.len(), path.display());
        Some(path)
    };

    enter(RunState::Reporting);
    Ok(RunReport {
        matched_rows: matches.len(),
        output_path,
        duplicate_rows: duplicates.len(),
        duplicate_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn request(directory: &Path) -> RunRequest {
        let mut request = RunRequest::new(directory);
        request.database = Some(Arc::new(Table::new(
            strings(&["id", "name"]),
            vec![strings(&["007", "A"]), strings(&["8", "B"]), strings(&["007", "C"])],
        )));
        request.lookup = Some(Arc::new(Table::new(strings(&["code"]), vec![strings(&["007"])])));
        request.key_column = Some("id".to_owned());
        request.columns = strings(&["name"]);
        request.date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        request
    }

    #[test]
    fn file_names_embed_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(result_file_name(OUTPUT_PREFIX, date), "抽出結果_20240401.xlsx");
        assert_eq!(result_file_name(DUPLICATE_PREFIX, date), "重複結果_20240401.xlsx");
    }

    #[test]
    fn every_missing_prerequisite_is_reported() {
        let request = RunRequest::new(".");
        match execute(&request) {
            Err(ExtractError::Precondition(missing)) => {
                assert_eq!(missing.0, vec![Prerequisite::Database, Prerequisite::Lookup, Prerequisite::KeyColumn]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn blank_key_column_counts_as_missing() {
        let directory = tempfile::tempdir().unwrap();
        let mut request = request(directory.path());
        request.key_column = Some(String::new());
        let error = execute(&request).unwrap_err();
        assert!(matches!(error, ExtractError::Precondition(ref missing) if missing.contains(Prerequisite::KeyColumn)));
        assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
    }

    #[test]
    fn matches_and_duplicates_are_written() {
        let directory = tempfile::tempdir().unwrap();
        let report = execute(&request(directory.path())).unwrap();
        assert_eq!(report.matched_rows, 2);
        assert_eq!(report.duplicate_rows, 2);
        assert_eq!(report.output_path, directory.path().join("抽出結果_20240401.xlsx"));
        assert_eq!(report.duplicate_path, Some(directory.path().join("重複結果_20240401.xlsx")));
        assert!(report.output_path.is_file());
    }

    #[test]
    fn schema_error_writes_nothing() {
        let directory = tempfile::tempdir().unwrap();
        let mut request = request(directory.path());
        request.columns = strings(&["phone"]);
        assert!(matches!(execute(&request), Err(ExtractError::Schema { .. })));
        assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
    }

    #[test]
    fn unwritable_output_is_a_write_error() {
        let directory = tempfile::tempdir().unwrap();
        let mut request = request(directory.path());
        request.output_dir = directory.path().join("missing");
        match execute(&request) {
            Err(ExtractError::Write { path, .. }) => {
                assert_eq!(path, directory.path().join("missing").join("抽出結果_20240401.xlsx"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
