use std::path::PathBuf;
use thiserror::Error;

/// Number of output column slots offered next to the key column
pub const MAX_OUTPUT_COLUMNS: usize = 40;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Session settings; nothing here is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub duplicate_dir: PathBuf,
    pub max_output_columns: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            output_dir: current.to_owned(),
            duplicate_dir: current,
            max_output_columns: MAX_OUTPUT_COLUMNS,
        }
    }
}

impl Settings {
    /// Overrides the defaults with directories given on the command line.
    pub fn with_directories(mut self, output_dir: Option<PathBuf>, duplicate_dir: Option<PathBuf>) -> Self {
        if let Some(directory) = output_dir {
            self.output_dir = directory;
        }
        if let Some(directory) = duplicate_dir {
            self.duplicate_dir = directory;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_directory("output_dir", &self.output_dir)?;
        check_directory("duplicate_dir", &self.duplicate_dir)?;
        if self.max_output_columns == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_output_columns",
                reason: "must be > 0".into(),
            });
        }
        Ok(())
    }
}

/// Rejects empty paths and paths that are not existing directories.
pub fn check_directory(field: &'static str, directory: &std::path::Path) -> Result<(), ConfigError> {
    if directory.as_os_str().is_empty() {
        return Err(ConfigError::MissingField { field });
    }
    if !directory.is_dir() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("{} is not a directory", directory.display()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.max_output_columns, 40);
        assert_eq!(settings.output_dir, settings.duplicate_dir);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn directories_must_exist() {
        let directory = tempfile::tempdir().unwrap();
        let settings = Settings::default()
            .with_directories(Some(directory.path().join("missing")), Some(directory.path().to_path_buf()));
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { field: "output_dir", .. })
        ));

        let settings = Settings::default().with_directories(None, Some(PathBuf::new()));
        assert_eq!(
            settings.validate(),
            Err(ConfigError::MissingField { field: "duplicate_dir" })
        );
    }

    #[test]
    fn column_limit_must_be_positive() {
        let settings = Settings {
            max_output_columns: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
