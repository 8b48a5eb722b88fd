//! ConfidenceVector: one score per tracked field, built once per recognition result.

use crate::config::{band, check_unit, ConfidenceLevel, ScoringConfig};
use crate::error::Result;
use crate::field::Field;
use std::collections::{BTreeMap, HashMap};

/// Absolute tolerance used by vector equality.
pub const SCORE_TOLERANCE: f64 = 0.001;

/// Immutable per-field confidence scores, each in [0, 1].
///
/// Thresholds are copied from the config at build time so the aggregates stay
/// pure functions of the vector.
#[derive(Debug, Clone)]
pub struct ConfidenceVector {
    scores: [f64; 6],
    low_threshold: f64,
    medium_threshold: f64,
}

impl ConfidenceVector {
    /// Build from a partial mapping. Fields not present take the config default.
    pub fn build(scores: &HashMap<Field, f64>, config: &ScoringConfig) -> Result<Self> {
        let mut out = [0.0; 6];
        for field in Field::ALL {
            let score = match scores.get(&field) {
                Some(&s) => {
                    check_unit(&format!("{field} confidence"), s)?;
                    s
                }
                None => config.default_for(field),
            };
            out[field.index()] = score;
        }
        Ok(Self {
            scores: out,
            low_threshold: config.low_confidence_threshold(),
            medium_threshold: config.medium_confidence_threshold(),
        })
    }

    /// Vector holding every field's default.
    pub fn defaults(config: &ScoringConfig) -> Self {
        Self {
            scores: Field::ALL.map(|f| config.default_for(f)),
            low_threshold: config.low_confidence_threshold(),
            medium_threshold: config.medium_confidence_threshold(),
        }
    }

    pub fn get(&self, field: Field) -> f64 {
        self.scores[field.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    /// Mean of all six scores.
    pub fn average(&self) -> f64 {
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    /// Number of scores strictly below the low threshold.
    pub fn low_confidence_count(&self) -> usize {
        self.scores.iter().filter(|&&s| s < self.low_threshold).count()
    }

    pub fn has_low_confidence(&self) -> bool {
        self.low_confidence_count() > 0
    }

    /// Fields the display layer should flag, in display order.
    pub fn low_confidence_fields(&self) -> Vec<Field> {
        self.iter()
            .filter(|(_, s)| *s < self.low_threshold)
            .map(|(f, _)| f)
            .collect()
    }

    pub fn level(&self, field: Field) -> ConfidenceLevel {
        band(self.get(field), self.low_threshold, self.medium_threshold)
    }

    /// All six scores within `tolerance` of each other.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.scores
            .iter()
            .zip(other.scores.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Serializable view keyed by field.
    pub fn to_map(&self) -> BTreeMap<Field, f64> {
        self.iter().collect()
    }
}

/// Tolerance equality (see [`SCORE_TOLERANCE`]). Meant for change detection and
/// tests; it is not transitive.
impl PartialEq for ConfidenceVector {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, SCORE_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoringError;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let mut scores = HashMap::new();
        scores.insert(Field::Amount, 0.5);
        let v = ConfidenceVector::build(&scores, &cfg()).unwrap();
        assert_eq!(v.get(Field::Amount), 0.5);
        assert_eq!(v.get(Field::Category), 0.6);
        assert_eq!(v.get(Field::Notes), 0.3);
    }

    #[test]
    fn test_out_of_range_rejected() {
        for bad in [-0.01, 1.01, f64::NAN] {
            let mut scores = HashMap::new();
            scores.insert(Field::Date, bad);
            let err = ConfidenceVector::build(&scores, &cfg()).unwrap_err();
            assert!(matches!(err, ScoringError::OutOfRange { .. }), "{bad}");
        }
    }

    #[test]
    fn test_bounds_accepted() {
        let mut scores = HashMap::new();
        scores.insert(Field::Amount, 0.0);
        scores.insert(Field::Date, 1.0);
        assert!(ConfidenceVector::build(&scores, &cfg()).is_ok());
    }

    #[test]
    fn test_aggregates_on_defaults() {
        let v = ConfidenceVector::defaults(&cfg());
        // (0.9 + 0.6 + 0.6 + 0.5 + 0.9 + 0.3) / 6
        assert!((v.average() - 3.8 / 6.0).abs() < 1e-12);
        // category, account, description, notes are below 0.7
        assert_eq!(v.low_confidence_count(), 4);
        assert!(v.has_low_confidence());
        assert_eq!(
            v.low_confidence_fields(),
            vec![Field::Category, Field::Account, Field::Description, Field::Notes]
        );
        assert_eq!(v.level(Field::Amount), ConfidenceLevel::High);
        assert_eq!(v.level(Field::Notes), ConfidenceLevel::Low);
    }

    #[test]
    fn test_threshold_is_strict() {
        let scores: HashMap<Field, f64> = Field::ALL.iter().map(|&f| (f, 0.7)).collect();
        let v = ConfidenceVector::build(&scores, &cfg()).unwrap();
        assert_eq!(v.low_confidence_count(), 0);
        assert!(!v.has_low_confidence());
        assert_eq!(v.level(Field::Amount), ConfidenceLevel::Medium);
    }

    #[test]
    fn test_level_matches_config_banding() {
        let cfg = cfg();
        let scores: HashMap<Field, f64> = Field::ALL
            .iter()
            .zip([0.95, 0.8, 0.79, 0.7, 0.69, 0.0])
            .map(|(&f, s)| (f, s))
            .collect();
        let v = ConfidenceVector::build(&scores, &cfg).unwrap();
        for (field, score) in v.iter() {
            assert_eq!(v.level(field), cfg.level(score), "{field}");
        }
    }

    #[test]
    fn test_tolerance_equality() {
        let a = ConfidenceVector::defaults(&cfg());
        let mut scores = HashMap::new();
        scores.insert(Field::Amount, 0.9 + 0.0009);
        let b = ConfidenceVector::build(&scores, &cfg()).unwrap();
        assert_eq!(a, b);

        scores.insert(Field::Amount, 0.9 - 0.002);
        let c = ConfidenceVector::build(&scores, &cfg()).unwrap();
        assert_ne!(a, c);
    }
}
