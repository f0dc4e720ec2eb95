use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "code_extractor",
    version,
    about = "Extract database rows whose key is listed in a lookup workbook",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Directory for the extraction result (default: current directory)
    #[arg(long = "output-dir", value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,
    /// Directory for the duplicate result (default: current directory)
    #[arg(long = "duplicate-dir", value_name = "DIR", global = true)]
    pub duplicate_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Interactive session (default)
    Shell,
    /// Print the sheet names of a workbook
    Sheets {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run one extraction without prompting
    Extract {
        /// Database workbook
        #[arg(long, value_name = "FILE")]
        database: PathBuf,
        /// Lookup workbook; codes are read from its first column
        #[arg(long, value_name = "FILE")]
        lookup: PathBuf,
        /// Key column of the database
        #[arg(long, value_name = "COLUMN")]
        key: String,
        /// Additional output column, repeatable (at most 40)
        #[arg(long = "column", value_name = "COLUMN")]
        columns: Vec<String>,
        /// Database sheet name or glob pattern, repeatable (default: all sheets)
        #[arg(long = "database-sheet", value_name = "NAME|GLOB")]
        database_sheets: Vec<String>,
        /// Lookup sheet name or glob pattern, repeatable (default: all sheets)
        #[arg(long = "lookup-sheet", value_name = "NAME|GLOB")]
        lookup_sheets: Vec<String>,
    },
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Shell)
    }
}
