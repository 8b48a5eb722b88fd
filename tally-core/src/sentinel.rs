//! Per-field "unset" markers.
//!
//! A recognizer that cannot read a field often emits a placeholder instead of
//! leaving it blank. Those values are non-answers, not low-quality answers, so
//! the engine scores them with a fixed low confidence before consulting any
//! feedback history.
//!
//! Matching is exact after trimming and lowercasing. The uncategorized markers
//! apply to every field; the rest are field-specific.

use crate::field::Field;
use regex::Regex;
use std::sync::LazyLock;

/// Markers treated as placeholders for every field.
pub const UNIVERSAL_MARKERS: &[&str] = &["uncategorized", "未分类"];

const CATEGORY_MARKERS: &[&str] = &["unknown", "其他未分类"];
const ACCOUNT_MARKERS: &[&str] = &["unknown", "default", "未知", "未知账户"];
const DATE_MARKERS: &[&str] = &["unknown", "0000-00-00"];
const NONE: &[&str] = &[];

/// Amounts that only consist of zeros ("0", "0.00", "- ¥0.0", "0元", "0.00 usd").
/// Accepts the same sign, currency, grouping and unit spellings the review
/// normalizer parses. Input is already lowercased.
static ZERO_AMOUNT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[-+]?\s*[¥$€£]?\s*",
        r"0+(?:,000)*(?:\.0+)?",
        r"\s*(?:元|rmb|cny|usd)?$"
    ))
    .ok()
});

/// Field-specific literal markers (in addition to [`UNIVERSAL_MARKERS`]).
pub fn markers(field: Field) -> &'static [&'static str] {
    match field {
        Field::Category => CATEGORY_MARKERS,
        Field::Account => ACCOUNT_MARKERS,
        Field::Date => DATE_MARKERS,
        Field::Amount | Field::Description | Field::Notes => NONE,
    }
}

/// True when `value` is the recognizer's "unset" answer for `field`.
pub fn is_placeholder(field: Field, value: &str) -> bool {
    let v = value.trim().to_lowercase();
    if v.is_empty() {
        return false;
    }
    if UNIVERSAL_MARKERS.contains(&v.as_str()) || markers(field).contains(&v.as_str()) {
        return true;
    }
    match field {
        Field::Amount => ZERO_AMOUNT.as_ref().is_some_and(|re| re.is_match(&v)),
        _ => false,
    }
}
