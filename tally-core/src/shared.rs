//! SharedEngine — serialized access to one engine from many threads or tasks.
//!
//! Every operation takes the lock once, so a suggestion always reads a
//! consistent count/accuracy pair for its field. The engine lock is never
//! held across persistence: `persist` copies a snapshot, releases, then
//! writes. Saves are serialized on a separate lock that covers both the
//! snapshot and the write, so stores receive snapshots in ledger order and
//! an older one can never land after a newer one.

use crate::config::ScoringConfig;
use crate::engine::ScoringEngine;
use crate::error::Result;
use crate::feedback::{FeedbackEvent, FieldStats, LedgerSnapshot};
use crate::field::Field;
use crate::store::FeedbackStore;
use crate::vector::ConfidenceVector;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<ScoringEngine>>,
    persisting: Arc<Mutex<()>>,
}

impl SharedEngine {
    pub fn new(engine: ScoringEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
            persisting: Arc::new(Mutex::new(())),
        }
    }

    /// Engine seeded from whatever `store` holds.
    pub fn load(config: ScoringConfig, store: &dyn FeedbackStore) -> Result<Self> {
        let snapshot = store.load()?;
        Ok(Self::new(ScoringEngine::with_snapshot(config, snapshot)))
    }

    // A panic mid-operation cannot leave a torn ledger (mutations are a single
    // push or clear), so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, ScoringEngine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut ScoringEngine) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn record_feedback(
        &self,
        field: Field,
        original_value: &str,
        corrected_value: Option<&str>,
        was_correct: bool,
        original_confidence: f64,
    ) {
        self.lock()
            .record_feedback(field, original_value, corrected_value, was_correct, original_confidence);
    }

    pub fn record_event(&self, event: FeedbackEvent) {
        self.lock().record_event(event);
    }

    pub fn suggest_confidence(&self, field: Field, value: &str) -> f64 {
        self.lock().suggest_confidence(field, value)
    }

    pub fn score_fields<'a, I>(&self, values: I) -> Result<ConfidenceVector>
    where
        I: IntoIterator<Item = (Field, &'a str)>,
    {
        self.lock().score_fields(values)
    }

    pub fn accuracy_rate(&self, field: Field) -> f64 {
        self.lock().accuracy_rate(field)
    }

    pub fn event_count(&self, field: Field) -> usize {
        self.lock().event_count(field)
    }

    pub fn field_stats(&self) -> Vec<FieldStats> {
        self.lock().field_stats()
    }

    pub fn clear_history(&self) {
        self.lock().clear_history();
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.lock().snapshot()
    }

    /// Save the current ledger to `store` without holding the engine lock
    /// during the write.
    ///
    /// Concurrent calls queue up; each one snapshots only after the previous
    /// save returned, so the last save to finish holds the newest ledger.
    pub fn persist(&self, store: &dyn FeedbackStore) -> Result<()> {
        let _turn = self.persisting.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.snapshot();
        store.save(&snapshot)?;
        info!(events = snapshot.event_count(), "feedback history saved");
        Ok(())
    }
}
