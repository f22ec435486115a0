//! CSV archive of the drink event log.
//!
//! Rolling up collapses edits, appends one row per drink to the CSV file,
//! fsyncs it, and only then renames the log out of the way.

use crate::event_log::{latest_by_id, read_records};
use crate::{DrinkEvent, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
#[derive(Debug, serde::Serialize)]
struct ArchiveRow {
    id: String,
    logged_at: String,
    name: String,
    amount: f64,
    is_double: bool,
    bac_contribution: f64,
}

impl From<&DrinkEvent> for ArchiveRow {
    fn from(event: &DrinkEvent) -> Self {
        ArchiveRow {
            id: event.id.to_string(),
            logged_at: event.timestamp.to_rfc3339(),
            name: event.name.clone(),
            amount: event.amount,
            is_double: event.is_double,
            bac_contribution: event.bac_contribution,
        }
    }
}

/// Append the event log to `csv_path` and archive the log
///
/// Returns the number of drinks written. Deleted drinks are not written.
/// The log is renamed to `*.processed` (not deleted) after the CSV has
/// been synced.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = read_records(log_path)?;

    if records.is_empty() {
        tracing::info!("No records in event log to roll up");
        return Ok(0);
    }

    let events = latest_by_id(records);
    if !events.is_empty() {
        append_rows(csv_path, &events)?;
        tracing::info!("Wrote {} drink event(s) to CSV", events.len());
    }

    let processed_path = log_path.with_extension("jsonl.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived event log to {:?}", processed_path);

    Ok(events.len())
}

fn append_rows(csv_path: &Path, events: &[DrinkEvent]) -> Result<()> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only for a fresh file
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for event in events {
        writer.serialize(ArchiveRow::from(event))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    Ok(())
}

/// Remove archived `*.processed` logs from `dir`
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed log file(s)", count);
    }

    Ok(count)
}
