//! ScoringEngine — turns feedback history into suggested confidences.
//!
//! Suggestion rules, first match wins:
//! 1. empty value (after trim)        -> EMPTY_VALUE_CONFIDENCE
//! 2. placeholder value (sentinel)    -> PLACEHOLDER_CONFIDENCE
//! 3. no feedback for the field       -> field default
//! 4. otherwise                       -> default * (0.5 + accuracy * 0.5)
//!
//! Unknown field names only exist at the string boundary
//! ([`ScoringEngine::suggest_confidence_named`]) and fail before rule 1.

use crate::config::{ConfidenceLevel, ScoringConfig, EMPTY_VALUE_CONFIDENCE, PLACEHOLDER_CONFIDENCE};
use crate::error::Result;
use crate::feedback::{FeedbackEvent, FeedbackLedger, FieldStats, LedgerSnapshot};
use crate::field::Field;
use crate::sentinel;
use crate::vector::ConfidenceVector;
use std::collections::HashMap;
use tracing::{debug, info};

/// Owns one feedback ledger. Construct it explicitly and hand it (or a
/// [`SharedEngine`](crate::SharedEngine)) to whatever needs scoring.
#[derive(Debug, Default, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    ledger: FeedbackLedger,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            ledger: FeedbackLedger::new(),
        }
    }

    /// Engine whose ledger starts from a previously saved snapshot.
    pub fn with_snapshot(config: ScoringConfig, snapshot: LedgerSnapshot) -> Self {
        let mut engine = Self::new(config);
        engine.restore(snapshot);
        engine
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Record the user's verdict on a suggested value.
    ///
    /// Never rejected: any confidence that was shown is stored as given.
    pub fn record_feedback(
        &mut self,
        field: Field,
        original_value: &str,
        corrected_value: Option<&str>,
        was_correct: bool,
        original_confidence: f64,
    ) {
        self.record_event(FeedbackEvent::new(
            field,
            original_value,
            corrected_value.map(str::to_string),
            was_correct,
            original_confidence,
        ));
    }

    /// [`record_feedback`](Self::record_feedback) for an externally supplied field name.
    pub fn record_feedback_named(
        &mut self,
        field: &str,
        original_value: &str,
        corrected_value: Option<&str>,
        was_correct: bool,
        original_confidence: f64,
    ) -> Result<()> {
        let field: Field = field.parse()?;
        self.record_feedback(field, original_value, corrected_value, was_correct, original_confidence);
        Ok(())
    }

    /// Append a fully built event.
    pub fn record_event(&mut self, event: FeedbackEvent) {
        debug!(
            field = %event.field,
            was_correct = event.was_correct,
            original_confidence = event.original_confidence,
            "feedback recorded"
        );
        self.ledger.append(event);
    }

    /// Suggested confidence for `value` as the recognized content of `field`.
    pub fn suggest_confidence(&self, field: Field, value: &str) -> f64 {
        if value.trim().is_empty() {
            return EMPTY_VALUE_CONFIDENCE;
        }
        if sentinel::is_placeholder(field, value) {
            return PLACEHOLDER_CONFIDENCE;
        }
        self.blended_confidence(field)
    }

    /// Confidence any real (non-empty, non-placeholder) value of `field` gets
    /// right now: the default without history, otherwise the default scaled
    /// by historical accuracy into `[default / 2, default]`.
    pub fn blended_confidence(&self, field: Field) -> f64 {
        let default = self.config.default_for(field);
        let events = self.ledger.event_count(field);
        if events == 0 {
            return default;
        }

        let accuracy = self.ledger.accuracy_rate(field);
        let suggested = (default * (0.5 + accuracy * 0.5)).clamp(0.0, 1.0);
        debug!(%field, events, accuracy, suggested, "blended confidence");
        suggested
    }

    /// [`suggest_confidence`](Self::suggest_confidence) for an externally supplied field name.
    pub fn suggest_confidence_named(&self, field: &str, value: &str) -> Result<f64> {
        let field: Field = field.parse()?;
        Ok(self.suggest_confidence(field, value))
    }

    /// Score one recognition result. Fields the recognizer did not return keep
    /// their defaults.
    pub fn score_fields<'a, I>(&self, values: I) -> Result<ConfidenceVector>
    where
        I: IntoIterator<Item = (Field, &'a str)>,
    {
        let scores: HashMap<Field, f64> = values
            .into_iter()
            .map(|(field, value)| (field, self.suggest_confidence(field, value)))
            .collect();
        ConfidenceVector::build(&scores, &self.config)
    }

    pub fn accuracy_rate(&self, field: Field) -> f64 {
        self.ledger.accuracy_rate(field)
    }

    pub fn event_count(&self, field: Field) -> usize {
        self.ledger.event_count(field)
    }

    pub fn total_events(&self) -> usize {
        self.ledger.total_events()
    }

    /// Read-only view of a field's history.
    pub fn history(&self, field: Field) -> &[FeedbackEvent] {
        self.ledger.events(field)
    }

    pub fn field_stats(&self) -> Vec<FieldStats> {
        Field::ALL.iter().map(|&f| self.ledger.stats(f)).collect()
    }

    /// Drop every recorded event. Safe to call repeatedly.
    pub fn clear_history(&mut self) {
        let dropped = self.ledger.total_events();
        self.ledger.clear();
        info!(dropped, "feedback history cleared");
    }

    pub fn is_low(&self, score: f64) -> bool {
        self.config.is_low(score)
    }

    pub fn is_medium(&self, score: f64) -> bool {
        self.config.is_medium(score)
    }

    pub fn level(&self, score: f64) -> ConfidenceLevel {
        self.config.level(score)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    /// Replace the whole ledger with `snapshot`.
    pub fn restore(&mut self, snapshot: LedgerSnapshot) {
        self.ledger = FeedbackLedger::from_snapshot(snapshot);
        info!(events = self.ledger.total_events(), "feedback history restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoringError;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(ScoringConfig::default())
    }

    #[test]
    fn test_no_history_returns_default() {
        let e = engine();
        assert_eq!(e.suggest_confidence(Field::Amount, "100.0"), 0.9);
        assert_eq!(e.suggest_confidence(Field::Notes, "lunch with team"), 0.3);
    }

    #[test]
    fn test_empty_value_floor() {
        let e = engine();
        for f in Field::ALL {
            let s = e.suggest_confidence(f, "   ");
            assert!(s >= 0.1);
            assert!(s < e.config().default_for(f));
        }
    }

    #[test]
    fn test_placeholder_beats_history() {
        let mut e = engine();
        for _ in 0..5 {
            e.record_feedback(Field::Category, "餐饮", None, true, 0.6);
        }
        assert_eq!(e.suggest_confidence(Field::Category, "uncategorized"), PLACEHOLDER_CONFIDENCE);
        assert_eq!(e.suggest_confidence(Field::Category, ""), EMPTY_VALUE_CONFIDENCE);
    }

    #[test]
    fn test_blending_bounds() {
        let mut e = engine();
        e.record_feedback(Field::Date, "2026-02-18", Some("2026-02-17"), false, 0.9);
        assert!((e.suggest_confidence(Field::Date, "2026-02-18") - 0.45).abs() < 1e-12);

        e.clear_history();
        e.record_feedback(Field::Date, "2026-02-18", None, true, 0.9);
        assert!((e.suggest_confidence(Field::Date, "2026-02-18") - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_named_boundary() {
        let mut e = engine();
        assert_eq!(
            e.suggest_confidence_named("tip", "3").unwrap_err(),
            ScoringError::unknown_field("tip")
        );
        assert!(e.record_feedback_named("tip", "3", None, true, 0.5).is_err());
        assert_eq!(e.total_events(), 0);

        e.record_feedback_named("amount", "3", None, true, 0.5).unwrap();
        assert_eq!(e.event_count(Field::Amount), 1);
        assert_eq!(e.suggest_confidence_named("amount", "3").unwrap(), 0.9);
    }

    #[test]
    fn test_any_confidence_is_accepted() {
        let mut e = engine();
        e.record_feedback(Field::Notes, "x", None, false, 7.5);
        e.record_feedback(Field::Notes, "x", None, true, -1.0);
        assert_eq!(e.event_count(Field::Notes), 2);
    }

    #[test]
    fn test_score_fields_fills_missing() {
        let mut e = engine();
        e.record_feedback(Field::Amount, "10", None, false, 0.9);
        let v = e
            .score_fields([(Field::Amount, "12.00"), (Field::Category, "uncategorized")])
            .unwrap();
        assert!((v.get(Field::Amount) - 0.45).abs() < 1e-12);
        assert_eq!(v.get(Field::Category), PLACEHOLDER_CONFIDENCE);
        assert_eq!(v.get(Field::Date), 0.9);
        assert!(v.has_low_confidence());
    }

    #[test]
    fn test_thresholds() {
        let e = engine();
        assert!(e.is_low(0.5));
        assert!(!e.is_low(0.7));
        assert!(e.is_medium(0.75));
        assert!(!e.is_medium(0.8));
        assert_eq!(e.level(0.85), ConfidenceLevel::High);
    }

    #[test]
    fn test_restore_replaces_history() {
        let mut a = engine();
        a.record_feedback(Field::Account, "Chase", None, true, 0.6);
        let snap = a.snapshot();

        let mut b = engine();
        b.record_feedback(Field::Notes, "n", None, false, 0.3);
        b.restore(snap);
        assert_eq!(b.event_count(Field::Account), 1);
        assert_eq!(b.event_count(Field::Notes), 0);

        let c = ScoringEngine::with_snapshot(ScoringConfig::default(), b.snapshot());
        assert_eq!(c.accuracy_rate(Field::Account), 1.0);
    }

    #[test]
    fn test_field_stats_cover_every_field() {
        let mut e = engine();
        e.record_feedback(Field::Description, "Lunch", Some("Team lunch"), false, 0.5);
        let stats = e.field_stats();
        assert_eq!(stats.len(), 6);
        let desc = stats.iter().find(|s| s.field == Field::Description).unwrap();
        assert_eq!(desc.events, 1);
        assert_eq!(desc.correct, 0);
        assert_eq!(e.history(Field::Description)[0].corrected_value.as_deref(), Some("Team lunch"));
    }
}
