use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tally_core::{Field, ScoringError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("invalid recognition JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("recognition payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("field {field} has a non-scalar value")]
    UnsupportedValue { field: Field },
}

/// Raw field values produced by the recognizer for one transaction.
///
/// Values are kept verbatim; scoring decides what counts as empty or a
/// placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecognizedFields {
    values: BTreeMap<Field, String>,
}

impl RecognizedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a recognizer payload such as
    /// `{"amount": 32.5, "category": "餐饮", "date": "2026-02-18", "notes": null}`.
    ///
    /// Numbers and booleans are stringified, `null` means "not returned", and
    /// keys outside the tracked set fail with `UnknownField`.
    pub fn from_json_str(s: &str) -> Result<Self, IngestError> {
        let v: Value = serde_json::from_str(s)?;
        Self::from_json_value(&v)
    }

    pub fn from_json_value(v: &Value) -> Result<Self, IngestError> {
        let obj = match v {
            Value::Object(m) => m,
            Value::Array(_) => return Err(IngestError::NotAnObject("array")),
            Value::String(_) => return Err(IngestError::NotAnObject("string")),
            Value::Number(_) => return Err(IngestError::NotAnObject("number")),
            Value::Bool(_) => return Err(IngestError::NotAnObject("bool")),
            Value::Null => return Err(IngestError::NotAnObject("null")),
        };

        let mut out = Self::new();
        for (key, value) in obj {
            let field: Field = key.parse()?;
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(IngestError::UnsupportedValue { field });
                }
            };
            out.values.insert(field, text);
        }
        Ok(out)
    }

    /// Build from string-keyed pairs (form input, query params, ...).
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, IngestError>
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut out = Self::new();
        for (k, v) in pairs {
            let field: Field = k.as_ref().parse()?;
            out.values.insert(field, v.into());
        }
        Ok(out)
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }
}
