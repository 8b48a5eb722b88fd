//! tally-ingest: recognizer payload intake and review-to-feedback derivation.

pub mod normalize;
pub mod review;
pub mod types;

pub use review::{corrected_fields, derive_feedback};
pub use types::{IngestError, RecognizedFields};
