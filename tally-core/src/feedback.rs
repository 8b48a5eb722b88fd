//! FeedbackLedger — append-only correctness history per field.
//!
//! Events are kept in insertion order but only counted; recency plays no role
//! in accuracy. The ledger is saved and restored as a whole
//! ([`LedgerSnapshot`]), never partially.

use crate::field::Field;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// One accept/reject/correct decision made by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub field: Field,
    /// Value the recognizer produced.
    pub original_value: String,
    /// Value the user replaced it with, if any.
    pub corrected_value: Option<String>,
    pub was_correct: bool,
    /// Confidence that was shown next to the original value.
    pub original_confidence: f64,
    pub recorded_at: DateTime<Utc>,
}

impl FeedbackEvent {
    pub fn new(
        field: Field,
        original_value: impl Into<String>,
        corrected_value: Option<String>,
        was_correct: bool,
        original_confidence: f64,
    ) -> Self {
        Self {
            field,
            original_value: original_value.into(),
            corrected_value,
            was_correct,
            original_confidence,
            recorded_at: Utc::now(),
        }
    }
}

/// Per-field counters derived from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    pub field: Field,
    pub events: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub last_recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone)]
pub struct FeedbackLedger {
    events: HashMap<Field, Vec<FeedbackEvent>>,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the event's field sequence.
    pub fn append(&mut self, event: FeedbackEvent) {
        self.events.entry(event.field).or_default().push(event);
    }

    pub fn event_count(&self, field: Field) -> usize {
        self.events.get(&field).map_or(0, Vec::len)
    }

    pub fn correct_count(&self, field: Field) -> usize {
        self.events(field).iter().filter(|e| e.was_correct).count()
    }

    /// `correct / total` for the field, or 0.0 with no history.
    ///
    /// 0.0 here means "no signal"; check [`event_count`](Self::event_count)
    /// before reading it as an accuracy.
    pub fn accuracy_rate(&self, field: Field) -> f64 {
        let total = self.event_count(field);
        if total == 0 {
            return 0.0;
        }
        self.correct_count(field) as f64 / total as f64
    }

    pub fn events(&self, field: Field) -> &[FeedbackEvent] {
        self.events.get(&field).map_or(&[], Vec::as_slice)
    }

    pub fn total_events(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_events() == 0
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn stats(&self, field: Field) -> FieldStats {
        let events = self.events(field);
        let correct = events.iter().filter(|e| e.was_correct).count();
        FieldStats {
            field,
            events: events.len(),
            correct,
            accuracy: if events.is_empty() {
                0.0
            } else {
                correct as f64 / events.len() as f64
            },
            last_recorded_at: events.last().map(|e| e.recorded_at),
        }
    }

    /// Copy of the whole ledger in its persisted shape.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut fields = BTreeMap::new();
        for field in Field::ALL {
            let events = self.events(field);
            if events.is_empty() {
                continue;
            }
            fields.insert(
                field.as_str().to_string(),
                events.iter().map(EventRecord::from).collect(),
            );
        }
        LedgerSnapshot { fields }
    }

    /// Rebuild a ledger from a snapshot. Unknown field keys are skipped.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let mut ledger = Self::new();
        for (name, records) in snapshot.fields {
            let Ok(field) = name.parse::<Field>() else {
                warn!(field = %name, events = records.len(), "ignoring unknown field in ledger snapshot");
                continue;
            };
            for r in records {
                ledger.append(r.into_event(field));
            }
        }
        ledger
    }
}

/// Persisted form of an event; the field is the key it is stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub original_value: String,
    #[serde(default)]
    pub corrected_value: Option<String>,
    pub was_correct: bool,
    pub original_confidence: f64,
    pub recorded_at: DateTime<Utc>,
}

impl EventRecord {
    fn into_event(self, field: Field) -> FeedbackEvent {
        FeedbackEvent {
            field,
            original_value: self.original_value,
            corrected_value: self.corrected_value,
            was_correct: self.was_correct,
            original_confidence: self.original_confidence,
            recorded_at: self.recorded_at,
        }
    }
}

impl From<&FeedbackEvent> for EventRecord {
    fn from(e: &FeedbackEvent) -> Self {
        Self {
            original_value: e.original_value.clone(),
            corrected_value: e.corrected_value.clone(),
            was_correct: e.was_correct,
            original_confidence: e.original_confidence,
            recorded_at: e.recorded_at,
        }
    }
}

/// Whole-ledger snapshot: field name -> events in insertion order.
///
/// Serializes as a plain JSON object, e.g.
/// `{"amount": [{"original_value": "12.5", ...}], "category": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerSnapshot {
    pub fields: BTreeMap<String, Vec<EventRecord>>,
}

impl LedgerSnapshot {
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(Vec::is_empty)
    }

    pub fn event_count(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }
}
