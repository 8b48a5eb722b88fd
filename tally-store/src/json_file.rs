//! JSON file store for the feedback ledger.
//!
//! The whole snapshot is written to a sibling temp file and renamed over the
//! target, so a crash mid-save leaves the previous file intact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tally_core::{FeedbackStore, LedgerSnapshot, Result, ScoringError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "feedback.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut f = fs::File::create(path)?;
    f.write_all(bytes)?;
    f.sync_all()
}

fn unavailable(action: &str, path: &Path, err: impl std::fmt::Display) -> ScoringError {
    ScoringError::persistence(format!("{action} {}: {err}", path.display()))
}

impl FeedbackStore for JsonFileStore {
    fn load(&self) -> Result<LedgerSnapshot> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no saved feedback; starting empty");
            return Ok(LedgerSnapshot::default());
        }
        let s = fs::read_to_string(&self.path).map_err(|e| unavailable("read", &self.path, e))?;
        if s.trim().is_empty() {
            return Ok(LedgerSnapshot::default());
        }
        let snapshot: LedgerSnapshot =
            serde_json::from_str(&s).map_err(|e| unavailable("parse", &self.path, e))?;
        info!(path = %self.path.display(), events = snapshot.event_count(), "feedback loaded");
        Ok(snapshot)
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| unavailable("create", dir, e))?;
        }
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| unavailable("serialize", &self.path, e))?;

        let tmp = self.temp_path();
        let replaced = write_synced(&tmp, json.as_bytes())
            .map_err(|e| unavailable("write", &tmp, e))
            .and_then(|()| {
                fs::rename(&tmp, &self.path).map_err(|e| unavailable("replace", &self.path, e))
            });
        if let Err(err) = replaced {
            if let Err(e) = fs::remove_file(&tmp) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %e, "could not remove temp ledger");
                }
            }
            return Err(err);
        }

        debug!(path = %self.path.display(), events = snapshot.event_count(), "feedback saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{FeedbackEvent, FeedbackLedger, Field};

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("feedback.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/feedback.json"));

        let mut l = FeedbackLedger::new();
        l.append(FeedbackEvent::new(Field::Account, "Chase", Some("AMEX".into()), false, 0.6));
        store.save(&l.snapshot()).unwrap();

        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), l.snapshot());
    }

    #[test]
    fn test_failed_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        // a non-empty directory at the target path makes the rename fail
        fs::create_dir_all(path.join("occupied")).unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.save(&LedgerSnapshot::default()).unwrap_err();
        assert!(matches!(err, ScoringError::PersistenceUnavailable { .. }));
        assert!(!store.temp_path().exists());
        assert!(path.join("occupied").is_dir());
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ScoringError::PersistenceUnavailable { .. }));
    }
}
