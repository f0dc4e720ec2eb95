//! Matching, projection, duplicate detection and the extraction run.

pub(crate) mod duplicates;
pub(crate) mod matcher;
pub(crate) mod run;
pub(crate) mod selection;
