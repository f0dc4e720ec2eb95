//! Interactive terminal session built on `rustyline`.

use crate::config::Settings;
use crate::extract::run::RunReport;
use crate::session::LoadedTable;
use crate::session::Session;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::criteria::SheetSelector;
use crate::table::loader::list_sheets;
use crate::worker::spawn;
use crate::worker::Job;
use crate::worker::Msg;
use crate::worker::Target;
use anyhow::Context;
use chrono::Local;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const PROMPT: &str = "extract> ";
const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

const HELP: &str = "\
Commands:
  db <path>                 load the database workbook
  lookup <path>             load the lookup workbook (codes in the first column)
  out <dir>                 set the output directory
  dup <dir>                 set the duplicate output directory
  columns                   list the database columns
  key <name|index>          choose the key column
  col <slot> <name|index>   set an output column slot (1-40), '-' clears it
  cols <name|index>...      fill the output slots in order, clearing the rest
                            (quote names containing spaces: cols \"貸出 コード\" 2)
  status                    show the current session
  run                       extract and write the result workbooks
  help                      show this help
  quit | exit               leave";

/// A parsed shell command line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Database(PathBuf),
    Lookup(PathBuf),
    OutputDir(PathBuf),
    DuplicateDir(PathBuf),
    Columns,
    Key(String),
    Slot { slot: usize, column: Option<String> },
    Slots(Vec<String>),
    Status,
    Run,
    Help,
    Quit,
    Empty,
}

/// Parses one input line; command names are case-insensitive.
pub(crate) fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let argument = |usage: &str| {
        if rest.is_empty() {
            Err(format!("Usage: {usage}"))
        } else {
            Ok(rest.trim_matches('"').to_owned())
        }
    };
    let command = match name.to_ascii_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "db" => ShellCommand::Database(PathBuf::from(argument("db <path>")?)),
        "lookup" => ShellCommand::Lookup(PathBuf::from(argument("lookup <path>")?)),
        "out" => ShellCommand::OutputDir(PathBuf::from(argument("out <dir>")?)),
        "dup" => ShellCommand::DuplicateDir(PathBuf::from(argument("dup <dir>")?)),
        "columns" => ShellCommand::Columns,
        "key" => ShellCommand::Key(argument("key <name|index>")?),
        "col" => {
            let usage = "col <slot> <name|index|->";
            let (slot, column) = rest.split_once(char::is_whitespace).ok_or(format!("Usage: {usage}"))?;
            let slot = slot.parse::<usize>().map_err(|_| format!("Usage: {usage}"))?;
            let column = match column.trim() {
                "-" => None,
                column => Some(column.trim_matches('"').to_owned()),
            };
            ShellCommand::Slot { slot, column }
        }
        "cols" => ShellCommand::Slots(split_arguments(rest)?),
        "status" => ShellCommand::Status,
        "run" => ShellCommand::Run,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("Unknown command '{other}', type 'help'")),
    };
    Ok(command)
}

/// Splits on whitespace; double quotes keep a name with spaces together.
fn split_arguments(text: &str) -> Result<Vec<String>, String> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;
    for character in text.chars() {
        match character {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            character if character.is_whitespace() && !quoted => {
                if started {
                    arguments.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            character => {
                current.push(character);
                started = true;
            }
        }
    }
    if quoted {
        return Err("Unterminated quote".to_owned());
    }
    if started {
        arguments.push(current);
    }
    Ok(arguments)
}

/// Selection used without asking when the workbook has at most one sheet.
pub(crate) fn implicit_sheet_choice(sheet_names: &[String]) -> Option<Criteria> {
    if sheet_names.len() <= 1 {
        Some(Criteria::all())
    } else {
        None
    }
}

/// Turns the answer to the sheet prompt into a selection.
///
/// `all` selects every sheet and an empty answer selects none. Otherwise the
/// answer is a comma separated list of 1-based sheet numbers, names or glob patterns.
pub(crate) fn parse_sheet_choice(answer: &str, sheet_names: &[String]) -> Result<Criteria, String> {
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("all") {
        return Ok(Criteria::all());
    }
    let mut selectors = Vec::new();
    for entry in answer.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let selector = match entry.parse::<usize>() {
            Ok(number) => number
                .checked_sub(1)
                .and_then(|index| sheet_names.get(index))
                .map(|name| SheetSelector::Name(name.to_owned()))
                .ok_or_else(|| format!("No sheet number {number}"))?,
            Err(_) => SheetSelector::parse(entry)
                .map_err(|error| format!("Invalid sheet pattern '{entry}': {error}"))?,
        };
        selectors.push(selector);
    }
    Ok(Criteria::from_selectors(selectors))
}

struct Spinner {
    label: String,
    frame: usize,
}

impl Spinner {
    fn new(label: &str) -> Self {
        Spinner { label: label.to_owned(), frame: 0 }
    }

    fn tick(&mut self) {
        let character = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        self.frame += 1;
        eprint!("\r{} {}", character, self.label);
        let _ = std::io::stderr().flush();
    }

    fn finish(&self) {
        if self.frame > 0 {
            eprint!("\r{}\r", " ".repeat(self.label.chars().count() + 2));
            let _ = std::io::stderr().flush();
        }
    }
}

/// Runs a job on a worker while showing the spinner.
fn run_job(job: Job, label: &str) -> Option<Msg> {
    let handle = spawn(job);
    let mut spinner = Spinner::new(label);
    let msg = handle.wait(SPINNER_INTERVAL, || spinner.tick());
    spinner.finish();
    msg
}

fn describe(loaded: Option<&LoadedTable>) -> String {
    match loaded {
        Some(loaded) => format!(
            "{} [{}] ({} rows, {} columns)",
            loaded.path.display(),
            loaded.sheets.join(", "),
            loaded.table.len(),
            loaded.table.columns().len()
        ),
        None => "(not loaded)".to_owned(),
    }
}

fn print_report(report: &RunReport) {
    println!("Extraction finished.");
    println!("{report}");
}

pub struct Shell {
    session: Session,
    editor: DefaultEditor,
}

impl Shell {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let editor = DefaultEditor::new().context("Failed to initialize line editor")?;
        Ok(Shell {
            session: Session::new(settings),
            editor,
        })
    }

    /// Reads and runs commands until `quit` or end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        println!("Lending code extractor. Type 'help' for commands.");
        loop {
            let line = match self.editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(error) => return Err(error).context("Failed to read input"),
            };
            let _ = self.editor.add_history_entry(line.as_str());
            match parse_command(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => self.dispatch(command),
                Err(message) => println!("{message}"),
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, command: ShellCommand) {
        let outcome = match command {
            ShellCommand::Database(path) => {
                self.load(Target::Database, path);
                Ok(())
            }
            ShellCommand::Lookup(path) => {
                self.load(Target::Lookup, path);
                Ok(())
            }
            ShellCommand::OutputDir(directory) => self
                .session
                .set_output_dir(directory)
                .map(|_| println!("Output directory: {}", self.session.settings().output_dir.display())),
            ShellCommand::DuplicateDir(directory) => self
                .session
                .set_duplicate_dir(directory)
                .map(|_| println!("Duplicate directory: {}", self.session.settings().duplicate_dir.display())),
            ShellCommand::Columns => {
                self.print_columns();
                Ok(())
            }
            ShellCommand::Key(column) => self
                .session
                .set_key_column(&column)
                .map(|key| println!("Key column: {key}")),
            ShellCommand::Slot { slot, column } => self
                .session
                .set_slot(slot, column.as_deref())
                .map(|_| println!("Slot {slot}: {}", column_label(self.session.slots().get(slot - 1)))),
            ShellCommand::Slots(columns) => {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                self.session.set_slots(&columns).map(|_| self.print_slots())
            }
            ShellCommand::Status => {
                self.print_status();
                Ok(())
            }
            ShellCommand::Run => {
                self.extract();
                Ok(())
            }
            ShellCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            ShellCommand::Quit | ShellCommand::Empty => Ok(()),
        };
        if let Err(error) = outcome {
            println!("Error: {error}");
        }
    }

    fn prompt_sheets(&mut self, sheet_names: &[String]) -> Option<Criteria> {
        if let Some(criteria) = implicit_sheet_choice(sheet_names) {
            return Some(criteria);
        }
        println!("The workbook has {} sheets:", sheet_names.len());
        for (index, name) in sheet_names.iter().enumerate() {
            println!("  {:>2}. {}", index + 1, name);
        }
        loop {
            let answer = match self.editor.readline("Sheets (e.g. 1,3 or all, empty for none): ") {
                Ok(answer) => answer,
                Err(_) => return None,
            };
            match parse_sheet_choice(&answer, sheet_names) {
                Ok(criteria) => return Some(criteria),
                Err(message) => println!("{message}"),
            }
        }
    }

    fn load(&mut self, target: Target, path: PathBuf) {
        let sheet_names = match list_sheets(&path) {
            Ok(sheet_names) => sheet_names,
            Err(error) => {
                println!("Error: {error}");
                return;
            }
        };
        let Some(criteria) = self.prompt_sheets(&sheet_names) else {
            println!("Load cancelled");
            return;
        };

        let label = format!("Loading {}", path.display());
        match run_job(Job::Load { target, path, criteria }, &label) {
            Some(Msg::Loaded { target, result }) => match self.session.apply_load(target, result) {
                Ok(cleared) => {
                    let loaded = match target {
                        Target::Database => self.session.database(),
                        Target::Lookup => self.session.lookup(),
                    };
                    if let Some(loaded) = loaded {
                        println!("Loaded {} rows from {}", loaded.table.len(), loaded.path.display());
                        println!("Columns: {}", loaded.table.columns().join(", "));
                    }
                    if !cleared.is_empty() {
                        println!("Cleared choices no longer in the database: {}", cleared.join(", "));
                    }
                }
                Err(error) => println!("Error: {error}"),
            },
            Some(Msg::Extracted(_)) | None => println!("Error: load did not complete"),
        }
    }

    fn extract(&mut self) {
        let request = self.session.run_request(Local::now().date_naive());
        match run_job(Job::Extract(request), "Extracting") {
            Some(Msg::Extracted(Ok(report))) => print_report(&report),
            Some(Msg::Extracted(Err(error))) => println!("Error: {error}"),
            Some(Msg::Loaded { .. }) | None => println!("Error: extraction did not complete"),
        }
    }

    fn print_columns(&self) {
        match self.session.database() {
            Some(database) => {
                for (index, column) in database.table.columns().iter().enumerate() {
                    println!("  {:>3}. {}", index + 1, column);
                }
            }
            None => println!("No database is loaded"),
        }
    }

    fn print_slots(&self) {
        let chosen: Vec<String> = self
            .session
            .slots()
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|column| format!("{}={}", index + 1, column)))
            .collect();
        if chosen.is_empty() {
            println!("Output columns: (key only)");
        } else {
            println!("Output columns: {}", chosen.join(", "));
        }
    }

    fn print_status(&self) {
        let settings = self.session.settings();
        println!("Database:      {}", describe(self.session.database()));
        println!("Lookup:        {}", describe(self.session.lookup()));
        println!("Output dir:    {}", settings.output_dir.display());
        println!("Duplicate dir: {}", settings.duplicate_dir.display());
        println!("Key column:    {}", self.session.key_column().unwrap_or("(not set)"));
        self.print_slots();
    }
}

fn column_label(slot: Option<&Option<String>>) -> &str {
    slot.and_then(Option::as_deref).unwrap_or("(cleared)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["April", "May", "Summary"].iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command("DB loans.xlsx"), Ok(ShellCommand::Database(PathBuf::from("loans.xlsx"))));
        assert_eq!(parse_command("  Run "), Ok(ShellCommand::Run));
        assert_eq!(parse_command(""), Ok(ShellCommand::Empty));
        assert_eq!(parse_command("exit"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn paths_may_contain_spaces_and_quotes() {
        assert_eq!(
            parse_command("lookup \"my codes.xlsx\""),
            Ok(ShellCommand::Lookup(PathBuf::from("my codes.xlsx")))
        );
    }

    #[test]
    fn slot_commands() {
        assert_eq!(
            parse_command("col 3 name"),
            Ok(ShellCommand::Slot { slot: 3, column: Some("name".to_owned()) })
        );
        assert_eq!(parse_command("col 3 -"), Ok(ShellCommand::Slot { slot: 3, column: None }));
        assert!(parse_command("col x name").is_err());
        assert!(parse_command("col 3").is_err());
        assert_eq!(
            parse_command("cols name 2"),
            Ok(ShellCommand::Slots(vec!["name".to_owned(), "2".to_owned()]))
        );
    }

    #[test]
    fn quoted_column_names_keep_their_spaces() {
        assert_eq!(
            parse_command("cols \"貸出 コード\" name 3"),
            Ok(ShellCommand::Slots(vec!["貸出 コード".to_owned(), "name".to_owned(), "3".to_owned()]))
        );
        assert_eq!(
            parse_command("col 2 \"貸出 コード\""),
            Ok(ShellCommand::Slot { slot: 2, column: Some("貸出 コード".to_owned()) })
        );
        assert_eq!(parse_command("cols \"\""), Ok(ShellCommand::Slots(vec![String::new()])));
        assert_eq!(parse_command("cols"), Ok(ShellCommand::Slots(Vec::new())));
        assert!(parse_command("cols \"open").is_err());
    }

    #[test]
    fn single_sheet_workbooks_need_no_prompt() {
        let criteria = implicit_sheet_choice(&[]).unwrap();
        assert!(criteria.accept("Sheet1"));

        let criteria = implicit_sheet_choice(&["Loans".to_owned()]).unwrap();
        assert!(criteria.accept("Loans"));

        assert!(implicit_sheet_choice(&names()[..2]).is_none());
        assert!(implicit_sheet_choice(&names()).is_none());
    }

    #[test]
    fn missing_arguments_and_unknown_commands() {
        assert_eq!(parse_command("key"), Err("Usage: key <name|index>".to_owned()));
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn sheet_choices() {
        let names = names();
        let criteria = parse_sheet_choice("1, 3", &names).unwrap();
        assert!(criteria.accept("April"));
        assert!(!criteria.accept("May"));
        assert!(criteria.accept("Summary"));

        let criteria = parse_sheet_choice("ALL", &names).unwrap();
        assert!(names.iter().all(|name| criteria.accept(name)));

        let criteria = parse_sheet_choice("", &names).unwrap();
        assert!(names.iter().all(|name| !criteria.accept(name)));

        let criteria = parse_sheet_choice("M*", &names).unwrap();
        assert!(criteria.accept("May"));
        assert!(!criteria.accept("April"));

        assert!(parse_sheet_choice("4", &names).is_err());
        assert!(parse_sheet_choice("0", &names).is_err());
    }
}
