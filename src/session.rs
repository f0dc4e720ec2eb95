//! State of one interactive session: the loaded tables and the user's choices.

use crate::config::check_directory;
use crate::config::ConfigError;
use crate::config::Settings;
use crate::error::ExtractError;
use crate::extract::run::RunRequest;
use crate::table::Table;
use crate::worker::Target;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No database is loaded")]
    NoDatabase,
    #[error("Column '{0}' does not exist in the database table")]
    UnknownColumn(String),
    #[error("Slot {slot} is out of range 1-{max}")]
    SlotOutOfRange { slot: usize, max: usize },
    #[error("{count} columns given but only {max} slots exist")]
    TooManyColumns { count: usize, max: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A table together with where it came from.
#[derive(Clone, Debug)]
pub struct LoadedTable {
    pub path: PathBuf,
    /// Sheets the table was built from, in workbook order
    pub sheets: Vec<String>,
    pub table: Arc<Table>,
}

/// Session state owned by the interactive layer.
///
/// Tables are only ever replaced whole, after a load has succeeded.
#[derive(Debug)]
pub struct Session {
    database: Option<LoadedTable>,
    lookup: Option<LoadedTable>,
    key_column: Option<String>,
    slots: Vec<Option<String>>,
    settings: Settings,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Session {
            database: None,
            lookup: None,
            key_column: None,
            slots: vec![None; settings.max_output_columns],
            settings,
        }
    }

    pub fn database(&self) -> Option<&LoadedTable> {
        self.database.as_ref()
    }

    pub fn lookup(&self) -> Option<&LoadedTable> {
        self.lookup.as_ref()
    }

    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref()
    }

    pub fn slots(&self) -> &[Option<String>] {
        &self.slots
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Installs a new database table.
    ///
    /// The key column and any slot naming a column the new table lacks are cleared.
    /// Returns the names that were cleared.
    pub fn install_database(&mut self, loaded: LoadedTable) -> Vec<String> {
        let mut cleared = Vec::new();
        let table = Arc::clone(&loaded.table);
        if let Some(key) = self.key_column.take() {
            if table.column_index(&key).is_some() {
                self.key_column = Some(key);
            } else {
                cleared.push(key);
            }
        }
        for slot in self.slots.iter_mut() {
            if let Some(column) = slot.take() {
                if table.column_index(&column).is_some() {
                    *slot = Some(column);
                } else {
                    cleared.push(column);
                }
            }
        }
        log::debug!("Database replaced by '{}', cleared {:?}", loaded.path.display(), cleared);
        self.database = Some(loaded);
        cleared
    }

    pub fn install_lookup(&mut self, loaded: LoadedTable) {
        log::debug!("Lookup replaced by '{}'", loaded.path.display());
        self.lookup = Some(loaded);
    }

    /// Applies the outcome of a load to `target`.
    ///
    /// A failed load leaves the session untouched, so the previous table and the
    /// choices made on it stay in place. Returns the names cleared by a new database.
    pub fn apply_load(
        &mut self,
        target: Target,
        result: Result<LoadedTable, ExtractError>,
    ) -> Result<Vec<String>, ExtractError> {
        let loaded = result?;
        match target {
            Target::Database => Ok(self.install_database(loaded)),
            Target::Lookup => {
                self.install_lookup(loaded);
                Ok(Vec::new())
            }
        }
    }

    /// Resolves a column given by exact name or by its 1-based position.
    pub fn resolve_column(&self, name_or_index: &str) -> Result<String, SessionError> {
        let database = self.database.as_ref().ok_or(SessionError::NoDatabase)?;
        let columns = database.table.columns();
        if let Some(position) = columns.iter().position(|column| column == name_or_index) {
            return Ok(columns[position].to_owned());
        }
        name_or_index
            .parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| columns.get(index))
            .cloned()
            .ok_or_else(|| SessionError::UnknownColumn(name_or_index.to_owned()))
    }

    pub fn set_key_column(&mut self, name_or_index: &str) -> Result<&str, SessionError> {
        let column = self.resolve_column(name_or_index)?;
        let key_column = self.key_column.insert(column);
        Ok(key_column.as_str())
    }

    /// Sets (or with `None` clears) the 1-based output slot.
    pub fn set_slot(&mut self, slot: usize, name_or_index: Option<&str>) -> Result<(), SessionError> {
        let max = self.slots.len();
        if slot == 0 || slot > max {
            return Err(SessionError::SlotOutOfRange { slot, max });
        }
        let column = name_or_index.map(|name| self.resolve_column(name)).transpose()?;
        self.slots[slot - 1] = column;
        Ok(())
    }

    /// Fills the slots in order and clears the rest.
    pub fn set_slots(&mut self, names_or_indexes: &[&str]) -> Result<(), SessionError> {
        let max = self.slots.len();
        if names_or_indexes.len() > max {
            return Err(SessionError::TooManyColumns { count: names_or_indexes.len(), max });
        }
        let columns = names_or_indexes
            .iter()
            .map(|name| self.resolve_column(name))
            .collect::<Result<Vec<String>, SessionError>>()?;
        self.slots = columns.into_iter().map(Some).collect();
        self.slots.resize(max, None);
        Ok(())
    }

    pub fn set_output_dir(&mut self, directory: PathBuf) -> Result<(), SessionError> {
        check_directory("output_dir", &directory)?;
        self.settings.output_dir = directory;
        Ok(())
    }

    pub fn set_duplicate_dir(&mut self, directory: PathBuf) -> Result<(), SessionError> {
        check_directory("duplicate_dir", &directory)?;
        self.settings.duplicate_dir = directory;
        Ok(())
    }

    /// Captures the current state as a run request dated `date`.
    pub fn run_request(&self, date: NaiveDate) -> RunRequest {
        RunRequest {
            database: self.database.as_ref().map(|loaded| Arc::clone(&loaded.table)),
            lookup: self.lookup.as_ref().map(|loaded| Arc::clone(&loaded.table)),
            key_column: self.key_column.to_owned(),
            columns: self.slots.iter().flatten().cloned().collect(),
            output_dir: self.settings.output_dir.to_owned(),
            duplicate_dir: self.settings.duplicate_dir.to_owned(),
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::criteria::Criteria;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn loaded(path: &str, columns: &[&str]) -> LoadedTable {
        LoadedTable {
            path: PathBuf::from(path),
            sheets: strings(&["Sheet1"]),
            table: Arc::new(Table::new(strings(columns), Vec::new())),
        }
    }

    fn session() -> Session {
        Session::new(Settings::default())
    }

    #[test]
    fn columns_resolve_by_name_or_position() {
        let mut session = session();
        assert_eq!(session.resolve_column("id"), Err(SessionError::NoDatabase));

        session.install_database(loaded("db.xlsx", &["id", "name", "3"]));
        assert_eq!(session.resolve_column("name").unwrap(), "name");
        assert_eq!(session.resolve_column("1").unwrap(), "id");
        assert_eq!(session.resolve_column("3").unwrap(), "3");
        assert_eq!(session.resolve_column("0"), Err(SessionError::UnknownColumn("0".to_owned())));
        assert_eq!(session.resolve_column("phone"), Err(SessionError::UnknownColumn("phone".to_owned())));
    }

    #[test]
    fn reloading_clears_vanished_choices() {
        let mut session = session();
        session.install_database(loaded("a.xlsx", &["id", "name", "branch"]));
        session.set_key_column("id").unwrap();
        session.set_slots(&["name", "branch"]).unwrap();

        let cleared = session.install_database(loaded("b.xlsx", &["id", "branch"]));
        assert_eq!(cleared, strings(&["name"]));
        assert_eq!(session.key_column(), Some("id"));
        assert_eq!(session.slots()[0], None);
        assert_eq!(session.slots()[1].as_deref(), Some("branch"));

        let cleared = session.install_database(loaded("c.xlsx", &["code"]));
        assert_eq!(cleared, strings(&["id", "branch"]));
        assert_eq!(session.key_column(), None);
    }

    #[test]
    fn failed_reload_keeps_previous_state() {
        let mut session = session();
        session.install_database(loaded("a.xlsx", &["id", "name"]));
        session.install_lookup(loaded("codes.xlsx", &["code"]));
        session.set_key_column("id").unwrap();
        session.set_slot(1, Some("name")).unwrap();

        let directory = tempfile::tempdir().unwrap();
        let missing = directory.path().join("missing.xlsx");
        let result = crate::worker::load(missing.to_owned(), &Criteria::all());
        assert!(matches!(
            session.apply_load(Target::Database, result),
            Err(ExtractError::Load { ref path, .. }) if *path == missing
        ));

        let corrupt = directory.path().join("corrupt.xlsx");
        std::fs::write(&corrupt, b"not a zip").unwrap();
        let result = crate::worker::load(corrupt, &Criteria::all());
        assert!(session.apply_load(Target::Lookup, result).is_err());

        let database = session.database().unwrap();
        assert_eq!(database.path, PathBuf::from("a.xlsx"));
        assert_eq!(database.table.columns(), strings(&["id", "name"]).as_slice());
        assert_eq!(session.lookup().unwrap().path, PathBuf::from("codes.xlsx"));
        assert_eq!(session.key_column(), Some("id"));
        assert_eq!(session.slots()[0].as_deref(), Some("name"));
    }

    #[test]
    fn successful_load_replaces_the_target() {
        let mut session = session();
        session.install_database(loaded("a.xlsx", &["id", "name"]));
        session.set_key_column("name").unwrap();

        let cleared = session.apply_load(Target::Database, Ok(loaded("b.xlsx", &["id"]))).unwrap();
        assert_eq!(cleared, strings(&["name"]));
        assert_eq!(session.database().unwrap().path, PathBuf::from("b.xlsx"));

        let cleared = session.apply_load(Target::Lookup, Ok(loaded("codes.xlsx", &["code"]))).unwrap();
        assert!(cleared.is_empty());
        assert_eq!(session.lookup().unwrap().path, PathBuf::from("codes.xlsx"));
    }

    #[test]
    fn slots_are_bounded() {
        let mut session = session();
        session.install_database(loaded("db.xlsx", &["id", "name"]));
        assert_eq!(session.set_slot(0, Some("id")), Err(SessionError::SlotOutOfRange { slot: 0, max: 40 }));
        assert_eq!(session.set_slot(41, Some("id")), Err(SessionError::SlotOutOfRange { slot: 41, max: 40 }));
        session.set_slot(40, Some("name")).unwrap();
        assert_eq!(session.slots()[39].as_deref(), Some("name"));
        session.set_slot(40, None).unwrap();
        assert!(session.slots().iter().all(Option::is_none));
    }

    #[test]
    fn run_request_carries_the_current_choices() {
        let mut session = session();
        session.install_database(loaded("db.xlsx", &["id", "name", "branch"]));
        session.install_lookup(loaded("codes.xlsx", &["code"]));
        session.set_key_column("1").unwrap();
        session.set_slot(3, Some("branch")).unwrap();
        session.set_slot(1, Some("name")).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let request = session.run_request(date);
        assert!(request.database.is_some());
        assert!(request.lookup.is_some());
        assert_eq!(request.key_column.as_deref(), Some("id"));
        assert_eq!(request.columns, strings(&["name", "branch"]));
        assert_eq!(request.date, date);
    }

    #[test]
    fn directories_must_exist() {
        let mut session = session();
        let directory = tempfile::tempdir().unwrap();
        session.set_output_dir(directory.path().to_path_buf()).unwrap();
        assert_eq!(session.settings().output_dir, directory.path());
        assert!(session.set_duplicate_dir(directory.path().join("missing")).is_err());
    }
}
