//! Error taxonomy for the scoring engine.

/// Result alias used across tally-core.
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Errors raised by scoring operations.
///
/// All variants describe caller misuse or an unavailable collaborator.
/// None of them is transient, so none is retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    /// A field name outside the tracked set was supplied at a string boundary.
    #[error("unknown field: {name:?}")]
    UnknownField { name: String },

    /// A confidence (or threshold) outside [0, 1].
    #[error("{what} out of range [0, 1]: {value}")]
    OutOfRange { what: String, value: f64 },

    /// The host's ledger storage could not be read or written.
    #[error("feedback persistence unavailable: {reason}")]
    PersistenceUnavailable { reason: String },

    /// Configuration overrides violate an ordering invariant.
    #[error("invalid scoring config: {0}")]
    InvalidConfig(String),
}

impl ScoringError {
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }

    pub fn out_of_range(what: impl Into<String>, value: f64) -> Self {
        Self::OutOfRange {
            what: what.into(),
            value,
        }
    }

    pub fn persistence(reason: impl std::fmt::Display) -> Self {
        Self::PersistenceUnavailable {
            reason: reason.to_string(),
        }
    }
}
