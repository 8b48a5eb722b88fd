//! Value normalization used when deciding whether the user kept a recognized value.
//!
//! Recognizers and users format the same value differently ("¥1,200" vs
//! "1200.00", "2026/02/18" vs "2026-02-18"). Those should count as accepted,
//! not as corrections.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tally_core::Field;

static AMOUNT_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?P<sign>[-+])?\s*[¥$€£]?\s*",
        r"(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)",
        r"\s*(?:元|rmb|cny|usd)?\s*$"
    ))
    .ok()
});

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日", "%m/%d/%Y"];

/// Parse a monetary amount. Currency markers and thousands separators are ignored.
pub fn parse_amount(s: &str) -> Option<f64> {
    let lowered = s.to_lowercase();
    let caps = AMOUNT_RE.as_ref()?.captures(&lowered)?;
    let mut amount: f64 = caps["num"].replace(',', "").parse().ok()?;
    if caps.name("sign").is_some_and(|m| m.as_str() == "-") {
        amount = -amount;
    }
    Some(amount)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn canonical_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when `a` and `b` denote the same value for `field`.
pub fn same_value(field: Field, a: &str, b: &str) -> bool {
    match field {
        Field::Amount => {
            if let (Some(x), Some(y)) = (parse_amount(a), parse_amount(b)) {
                return (x - y).abs() < 0.005;
            }
        }
        Field::Date => {
            if let (Some(x), Some(y)) = (parse_date(a), parse_date(b)) {
                return x == y;
            }
        }
        _ => {}
    }
    canonical_text(a) == canonical_text(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("32.5"), Some(32.5));
        assert_eq!(parse_amount("¥1,200.00"), Some(1200.0));
        assert_eq!(parse_amount("- $14.05"), Some(-14.05));
        assert_eq!(parse_amount("88元"), Some(88.0));
        assert_eq!(parse_amount("12 USD"), Some(12.0));
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_date() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap();
        assert_eq!(parse_date("2026-02-18"), Some(d));
        assert_eq!(parse_date("2026/02/18"), Some(d));
        assert_eq!(parse_date(" 02/18/2026 "), Some(d));
        assert_eq!(parse_date("2026年02月18日"), Some(d));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_zero_amounts_are_placeholders() {
        for v in ["0", "0.00", "- ¥0", "0元", "0.00 USD", "0 rmb", "0,000.00", "12", "0.01元", "¥1,200"] {
            let zero = parse_amount(v).is_some_and(|a| a == 0.0);
            assert_eq!(tally_core::is_placeholder(Field::Amount, v), zero, "{v}");
        }
    }

    #[test]
    fn test_same_value() {
        assert!(same_value(Field::Amount, "1200", "¥1,200.00"));
        assert!(!same_value(Field::Amount, "1200", "120"));
        assert!(same_value(Field::Date, "2026/02/18", "2026-02-18"));
        assert!(!same_value(Field::Date, "2026-02-18", "2026-02-17"));
        assert!(same_value(Field::Description, "Team  Lunch ", "team lunch"));
        assert!(!same_value(Field::Category, "餐饮", "交通"));
        // unparseable amounts fall back to text comparison
        assert!(same_value(Field::Amount, "n/a", "N/A"));
    }
}
