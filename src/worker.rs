//! Runs loads and extractions on worker threads so the shell stays responsive.
//!
//! Each job gets its own thread and reports once over a channel.

use crate::error::ExtractError;
use crate::extract::run::execute;
use crate::extract::run::RunReport;
use crate::extract::run::RunRequest;
use crate::session::LoadedTable;
use crate::spreadsheet::criteria::Criteria;
use crate::table::loader::read_table;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Which session table a load is meant for
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Database,
    Lookup,
}

#[derive(Debug)]
pub enum Job {
    Load {
        target: Target,
        path: PathBuf,
        criteria: Criteria,
    },
    Extract(RunRequest),
}

/// Completion message sent by a worker.
#[derive(Debug)]
pub enum Msg {
    Loaded {
        target: Target,
        result: Result<LoadedTable, ExtractError>,
    },
    Extracted(Result<RunReport, ExtractError>),
}

/// Loads a workbook into a table tagged with its source.
pub fn load(path: PathBuf, criteria: &Criteria) -> Result<LoadedTable, ExtractError> {
    let (sheets, table) = read_table(&path, criteria)?;
    Ok(LoadedTable {
        path,
        sheets,
        table: Arc::new(table),
    })
}

fn run(job: Job) -> Msg {
    match job {
        Job::Load { target, path, criteria } => Msg::Loaded {
            target,
            result: load(path, &criteria),
        },
        Job::Extract(request) => Msg::Extracted(execute(&request)),
    }
}

/// Receiving end of one spawned job.
pub struct JobHandle {
    rx: Receiver<Msg>,
}

/// Starts a job on its own thread.
pub fn spawn(job: Job) -> JobHandle {
    let (tx, rx) = mpsc::channel::<Msg>();
    log::debug!("Spawning worker for {:?}", job);
    thread::spawn(move || {
        let _ = tx.send(run(job));
    });
    JobHandle { rx }
}

impl JobHandle {
    /// Returns the message if the job has finished, without blocking.
    pub fn poll(&self) -> Option<Msg> {
        match self.rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until the job finishes, calling `on_tick` every `interval` meanwhile.
    ///
    /// `None` means the worker stopped without reporting.
    pub fn wait<F: FnMut()>(self, interval: Duration, mut on_tick: F) -> Option<Msg> {
        loop {
            match self.rx.recv_timeout(interval) {
                Ok(msg) => return Some(msg),
                Err(RecvTimeoutError::Timeout) => on_tick(),
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("Worker stopped without reporting");
                    return None;
                }
            }
        }
    }
}
