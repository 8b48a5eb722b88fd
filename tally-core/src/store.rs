//! Ledger persistence seam.
//!
//! The engine never performs I/O itself. A host that wants durable history
//! hands a [`FeedbackStore`] to [`SharedEngine::persist`](crate::SharedEngine::persist)
//! or calls it directly with a snapshot.

use crate::error::{Result, ScoringError};
use crate::feedback::LedgerSnapshot;
use std::sync::Mutex;

/// Whole-snapshot storage. Implementations must write atomically: a reader
/// sees either the previous snapshot or the new one.
///
/// Failures are reported as `PersistenceUnavailable`.
pub trait FeedbackStore: Send + Sync {
    /// Saved snapshot, or an empty one when nothing has been saved yet.
    fn load(&self) -> Result<LedgerSnapshot>;

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()>;
}

/// In-process store, mainly for tests and embedding hosts without a disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<LedgerSnapshot>>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, for exercising error paths.
    pub fn offline() -> Self {
        Self {
            saved: Mutex::new(None),
            offline: true,
        }
    }

    pub fn saved(&self) -> Option<LedgerSnapshot> {
        self.saved.lock().ok().and_then(|g| g.clone())
    }
}

impl FeedbackStore for MemoryStore {
    fn load(&self) -> Result<LedgerSnapshot> {
        if self.offline {
            return Err(ScoringError::persistence("memory store is offline"));
        }
        let guard = self
            .saved
            .lock()
            .map_err(|_| ScoringError::persistence("memory store lock poisoned"))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        if self.offline {
            return Err(ScoringError::persistence("memory store is offline"));
        }
        let mut guard = self
            .saved
            .lock()
            .map_err(|_| ScoringError::persistence("memory store lock poisoned"))?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}
