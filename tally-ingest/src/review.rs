//! Review: turn "what was recognized" + "what the user saved" into feedback.

use crate::normalize::same_value;
use crate::types::RecognizedFields;
use tally_core::{is_placeholder, ConfidenceVector, FeedbackEvent, Field};
use tracing::debug;

/// One feedback event per recognized field that carried an actual answer.
///
/// A field counts as correct when the saved value denotes the same thing as
/// the recognized one (see [`same_value`]). Fields the recognizer did not
/// return were never suggested and produce no feedback. Neither do empty or
/// placeholder answers: they are scored with fixed floors, so counting them
/// would only drag down the field's accuracy for later real values. A field
/// the user cleared is a correction to the empty string.
pub fn derive_feedback(
    recognized: &RecognizedFields,
    finalized: &RecognizedFields,
    shown: &ConfidenceVector,
) -> Vec<FeedbackEvent> {
    recognized
        .iter()
        .filter(|&(field, original)| {
            let answered = !original.trim().is_empty() && !is_placeholder(field, original);
            if !answered {
                debug!(%field, "no recognized answer; skipping review");
            }
            answered
        })
        .map(|(field, original)| {
            let saved = finalized.get(field).unwrap_or("");
            let was_correct = same_value(field, original, saved);
            let corrected = (!was_correct).then(|| saved.to_string());
            debug!(%field, was_correct, "review outcome");
            FeedbackEvent::new(field, original, corrected, was_correct, shown.get(field))
        })
        .collect()
}

/// Fields whose saved value differs from the recognized one.
pub fn corrected_fields(events: &[FeedbackEvent]) -> Vec<Field> {
    events
        .iter()
        .filter(|e| !e.was_correct)
        .map(|e| e.field)
        .collect()
}
