//! Tracked transaction fields

use crate::error::ScoringError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six transaction attributes the recognizer extracts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    #[serde(rename = "amount")]
    Amount,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "account")]
    Account,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "notes")]
    Notes,
}

impl Field {
    /// Every tracked field, in display order.
    pub const ALL: [Field; 6] = [
        Field::Amount,
        Field::Category,
        Field::Account,
        Field::Description,
        Field::Date,
        Field::Notes,
    ];

    /// Wire/display name (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Amount => "amount",
            Field::Category => "category",
            Field::Account => "account",
            Field::Description => "description",
            Field::Date => "date",
            Field::Notes => "notes",
        }
    }

    /// Position in [`Field::ALL`]; used for fixed-size per-field tables.
    pub(crate) fn index(&self) -> usize {
        match self {
            Field::Amount => 0,
            Field::Category => 1,
            Field::Account => 2,
            Field::Description => 3,
            Field::Date => 4,
            Field::Notes => 5,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ScoringError;

    /// Parse a field name. Surrounding whitespace and case are ignored;
    /// anything else outside the tracked set is `UnknownField`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == name)
            .ok_or_else(|| ScoringError::unknown_field(s))
    }
}
