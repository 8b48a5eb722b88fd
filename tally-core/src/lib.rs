//! tally-core: adaptive confidence scoring for AI-recognized transaction fields

pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod field;
pub mod sentinel;
pub mod shared;
pub mod store;
pub mod vector;

pub use config::{
    ConfidenceLevel, ConfigOverrides, ScoringConfig, EMPTY_VALUE_CONFIDENCE, PLACEHOLDER_CONFIDENCE,
};
pub use engine::ScoringEngine;
pub use error::{Result, ScoringError};
pub use feedback::{EventRecord, FeedbackEvent, FeedbackLedger, FieldStats, LedgerSnapshot};
pub use field::Field;
pub use sentinel::is_placeholder;
pub use shared::SharedEngine;
pub use store::{FeedbackStore, MemoryStore};
pub use vector::{ConfidenceVector, SCORE_TOLERANCE};
