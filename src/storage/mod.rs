//! JSONL persistence of detected opportunities and executions

pub mod executions;
pub mod opportunities;

pub use executions::*;
pub use opportunities::*;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const EXECUTIONS_DIR: &str = "output/executions";
pub const OPPORTUNITIES_DIR: &str = "output/opportunities";

/// Appends one JSON line to `<dir>/<prefix>_<utc date>.jsonl`.
pub(crate) fn append_record<T: Serialize>(dir: &Path, prefix: &str, record: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}_{}.jsonl", prefix, Utc::now().format("%Y-%m-%d")));

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", serde_json::to_string(record)?)?;

    Ok(path)
}
