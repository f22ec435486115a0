//! Append-only event log for logged, edited and deleted drinks.
//!
//! Records are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access. An edit appends a new drink line with
//! the same id and a delete appends a `{"deleted": "<id>"}` marker; readers
//! treat the last line per id as current.

use crate::{DrinkEvent, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One line of the event log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LogRecord {
    Drink(DrinkEvent),
    Deleted { deleted: Uuid },
}

impl LogRecord {
    pub fn id(&self) -> Uuid {
        match self {
            LogRecord::Drink(event) => event.id,
            LogRecord::Deleted { deleted } => *deleted,
        }
    }
}

/// Receiver for the changes a session goes through
pub trait EventSink {
    fn write(&mut self, record: &LogRecord) -> Result<()>;

    /// A drink was logged or edited
    fn append(&mut self, event: &DrinkEvent) -> Result<()> {
        self.write(&LogRecord::Drink(event.clone()))
    }

    /// A drink was deleted
    fn remove(&mut self, id: Uuid) -> Result<()> {
        self.write(&LogRecord::Deleted { deleted: id })
    }
}

/// JSONL-based event sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventSink for JsonlSink {
    fn write(&mut self, record: &LogRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let written = (&file).write_all(line.as_bytes());
        file.unlock()?;
        written?;

        tracing::debug!("Appended log record for {} to {:?}", record.id(), self.path);
        Ok(())
    }
}

/// Read every line of an event log, in file order
///
/// Malformed lines are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<LogRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut records = Vec::new();
    for (line_num, line_result) in BufReader::new(&file).lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LogRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping log line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} log record(s) from {:?}", records.len(), path);
    Ok(records)
}

/// Current drinks after replaying the log
///
/// Keeps the last record per id, ordered by first appearance, and drops
/// ids whose last record is a deletion.
pub fn latest_by_id(records: Vec<LogRecord>) -> Vec<DrinkEvent> {
    let mut latest: Vec<(Uuid, Option<DrinkEvent>)> = Vec::with_capacity(records.len());
    for record in records {
        let id = record.id();
        let current = match record {
            LogRecord::Drink(event) => Some(event),
            LogRecord::Deleted { .. } => None,
        };

        match latest.iter_mut().find(|(seen, _)| *seen == id) {
            Some(slot) => slot.1 = current,
            None => latest.push((id, current)),
        }
    }

    latest.into_iter().filter_map(|(_, event)| event).collect()
}
