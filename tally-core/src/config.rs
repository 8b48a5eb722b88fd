//! Per-field default confidences and the display thresholds.

use crate::error::{Result, ScoringError};
use crate::field::Field;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suggested confidence for a value that is empty after trimming.
pub const EMPTY_VALUE_CONFIDENCE: f64 = 0.1;

/// Suggested confidence for a recognized placeholder ("uncategorized", ...).
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.2;

/// Display band for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

/// Read-only scoring table.
///
/// Every default is the highest confidence the engine will ever suggest for
/// that field; feedback can only pull a suggestion down toward half of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    defaults: [f64; 6],
    low_confidence_threshold: f64,
    medium_confidence_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            // Indexed by Field::ALL order.
            defaults: [0.9, 0.6, 0.6, 0.5, 0.9, 0.3],
            low_confidence_threshold: 0.7,
            medium_confidence_threshold: 0.8,
        }
    }
}

/// Optional overrides, typically the `[scoring]` table of a host config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    /// Field name -> default confidence.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_confidence_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_confidence_threshold: Option<f64>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
            && self.low_confidence_threshold.is_none()
            && self.medium_confidence_threshold.is_none()
    }
}

impl ScoringConfig {
    /// Default confidence for a field.
    pub fn default_for(&self, field: Field) -> f64 {
        self.defaults[field.index()]
    }

    pub fn low_confidence_threshold(&self) -> f64 {
        self.low_confidence_threshold
    }

    pub fn medium_confidence_threshold(&self) -> f64 {
        self.medium_confidence_threshold
    }

    /// True when `score` falls strictly below the low threshold.
    pub fn is_low(&self, score: f64) -> bool {
        score < self.low_confidence_threshold
    }

    /// True when `score` sits in `[low, medium)`.
    pub fn is_medium(&self, score: f64) -> bool {
        score >= self.low_confidence_threshold && score < self.medium_confidence_threshold
    }

    pub fn level(&self, score: f64) -> ConfidenceLevel {
        band(score, self.low_confidence_threshold, self.medium_confidence_threshold)
    }

    /// Apply overrides on top of the built-in table and validate the result.
    pub fn with_overrides(overrides: &ConfigOverrides) -> Result<Self> {
        let mut cfg = Self::default();
        for (name, value) in &overrides.defaults {
            let field: Field = name.parse()?;
            cfg.defaults[field.index()] = *value;
        }
        if let Some(low) = overrides.low_confidence_threshold {
            cfg.low_confidence_threshold = low;
        }
        if let Some(medium) = overrides.medium_confidence_threshold {
            cfg.medium_confidence_threshold = medium;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the table invariants.
    pub fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            let d = self.default_for(field);
            check_unit(&format!("{field} default"), d)?;
            if d <= PLACEHOLDER_CONFIDENCE {
                return Err(ScoringError::InvalidConfig(format!(
                    "{field} default {d} must exceed placeholder confidence {PLACEHOLDER_CONFIDENCE}"
                )));
            }
        }
        check_unit("low_confidence_threshold", self.low_confidence_threshold)?;
        check_unit("medium_confidence_threshold", self.medium_confidence_threshold)?;
        if self.low_confidence_threshold >= self.medium_confidence_threshold {
            return Err(ScoringError::InvalidConfig(format!(
                "low threshold {} must be below medium threshold {}",
                self.low_confidence_threshold, self.medium_confidence_threshold
            )));
        }
        Ok(())
    }
}

/// Display band for `score`: low below `low`, medium in `[low, medium)`,
/// high from `medium` up.
pub(crate) fn band(score: f64, low: f64, medium: f64) -> ConfidenceLevel {
    if score < low {
        ConfidenceLevel::Low
    } else if score < medium {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::High
    }
}

/// `OutOfRange` unless `value` is a number in [0, 1]. NaN is rejected.
pub(crate) fn check_unit(what: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ScoringError::out_of_range(what, value))
    }
}
