//! Session state persistence with file locking.
//!
//! The CLI is the single owner of the session aggregate; it loads the
//! snapshot, runs it through the pure core, and saves the replacement.
//! Locking keeps two concurrent invocations from tearing the file.

use crate::{Error, Result, SessionState};
use fs2::FileExt;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl SessionState {
    /// Load the session snapshot at `path`
    ///
    /// A missing file loads as an empty session. An unreadable or corrupt
    /// file does too, with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        match read_locked(path) {
            Ok(Some(session)) => {
                tracing::debug!("Session at {:?} holds {} drink(s)", path, session.events.len());
                Ok(session)
            }
            Ok(None) => {
                tracing::info!("No session at {:?}, starting fresh", path);
                Ok(Self::default())
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable session {:?}: {}", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save the session atomically (locked temp file, fsync, rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("session path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let file = temp.as_file();
            file.lock_exclusive()?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
            drop(writer);
            file.sync_all()?;
            file.unlock()?;
        }

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved session to {:?}", path);
        Ok(())
    }

    /// Load, replace through `f`, and save
    ///
    /// `f` receives the current snapshot by value and returns the new one.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(SessionState) -> Result<SessionState>,
    {
        let current = Self::load(path)?;
        let next = f(current)?;
        next.save(path)?;
        Ok(next)
    }
}

/// Parse the snapshot under a shared lock; `None` when there is no file
fn read_locked(path: &Path) -> Result<Option<SessionState>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    file.lock_shared()?;
    let parsed: serde_json::Result<SessionState> = serde_json::from_reader(BufReader::new(&file));
    file.unlock()?;

    Ok(Some(parsed?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DrinkEvent;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(bac_contribution: f64) -> DrinkEvent {
        DrinkEvent {
            id: Uuid::new_v4(),
            name: "Red Wine".into(),
            glyph: "🍷".into(),
            amount: 1.0,
            is_double: false,
            timestamp: Utc::now(),
            bac_contribution,
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");

        let session = SessionState::default().apply(event(0.03)).apply(event(0.04));
        session.save(&path).unwrap();

        let loaded = SessionState::load(&path).unwrap();
        let ids: Vec<Uuid> = loaded.events.iter().map(|e| e.id).collect();
        let expected: Vec<Uuid> = session.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(loaded.events[0].timestamp, session.events[0].timestamp);
        assert!((loaded.bac - session.bac).abs() < 1e-12);
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let loaded = SessionState::load(&temp_dir.path().join("missing.json")).unwrap();
        assert!(loaded.events.is_empty());
        assert_eq!(loaded.bac, 0.0);
    }

    #[test]
    fn test_corrupted_session_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let loaded = SessionState::load(&path).unwrap();
        assert!(loaded.events.is_empty());
    }

    #[test]
    fn test_update_replaces_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        let first = event(0.06);

        SessionState::update(&path, |s| Ok(s.apply(first.clone()))).unwrap();
        let after_add = SessionState::load(&path).unwrap();
        assert_eq!(after_add.events.len(), 1);
        assert!(after_add.hours_until_safe > 0.0);

        SessionState::update(&path, |s| Ok(s.remove(first.id))).unwrap();
        let after_remove = SessionState::load(&path).unwrap();
        assert!(after_remove.events.is_empty());
        assert_eq!(after_remove.hours_until_safe, 0.0);
    }

    #[test]
    fn test_update_error_leaves_file_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        SessionState::default().apply(event(0.02)).save(&path).unwrap();

        let result = SessionState::update(&path, |_| Err(Error::EventNotFound(Uuid::new_v4().to_string())));
        assert!(result.is_err());
        assert_eq!(SessionState::load(&path).unwrap().events.len(), 1);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        SessionState::default().save(&path).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "session.json")
            .collect();
        assert!(extras.is_empty(), "Unexpected files: {:?}", extras);
    }
}
