use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use code_extractor::cli::{Cli, Command};
use code_extractor::shell::Shell;
use code_extractor::worker::load;
use code_extractor::{execute, list_sheets, Criteria, RunRequest, Settings, Table};
use env_logger::Env;
use std::path::Path;
use std::sync::Arc;

fn criteria(entries: &[String]) -> Result<Criteria> {
    if entries.is_empty() {
        return Ok(Criteria::all());
    }
    Criteria::parse(entries).context("Invalid sheet selection")
}

fn load_shared(path: &Path, entries: &[String]) -> Result<Arc<Table>> {
    let loaded = load(path.to_path_buf(), &criteria(entries)?)?;
    Ok(loaded.table)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::default().with_directories(cli.output_dir.clone(), cli.duplicate_dir.clone());
    settings.validate().context("Invalid directories")?;

    match cli.command() {
        Command::Shell => Shell::new(settings)?.run(),
        Command::Sheets { file } => {
            for (index, name) in list_sheets(file)?.iter().enumerate() {
                println!("{:>3}. {}", index + 1, name);
            }
            Ok(())
        }
        Command::Extract {
            database,
            lookup,
            key,
            columns,
            database_sheets,
            lookup_sheets,
        } => {
            if columns.len() > settings.max_output_columns {
                bail!(
                    "{} output columns given, at most {} are allowed",
                    columns.len(),
                    settings.max_output_columns
                );
            }
            let mut request = RunRequest::new(settings.output_dir.clone());
            request.duplicate_dir = settings.duplicate_dir.clone();
            request.database = Some(load_shared(database, database_sheets)?);
            request.lookup = Some(load_shared(lookup, lookup_sheets)?);
            request.key_column = Some(key.to_owned());
            request.columns = columns.to_owned();
            request.date = Local::now().date_naive();

            let report = execute(&request)?;
            println!("{report}");
            Ok(())
        }
    }
}
