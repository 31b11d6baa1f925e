//! Shape detection for untyped candidates.
//!
//! Anything an extractor digs up is an arbitrary decoded JSON value. Rather
//! than probing keys ad hoc at every call site, detection is a single
//! tagged-union decode: try the known shapes in priority order, keep the first
//! hit. Validation is "some shape matched".

use serde_json::Value;

/// Keys that can carry a price in record-style payloads.
pub const PRICE_KEYS: [&str; 4] = ["price", "value", "y", "amount"];

/// Keys that can carry a date/timestamp in record-style payloads.
pub const DATE_KEYS: [&str; 4] = ["date", "time", "x", "timestamp"];

/// Structural schema a candidate conforms to, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateShape {
    /// `{"labels": [...], "data": [...]}` — Chart.js style.
    LabelsData,
    /// `{"dates": [...], "prices": [...]}`.
    DatesPrices,
    /// `{"x": ..., "y": ...}` — axis-style payload.
    Xy,
    /// `[{"date": ..., "price": ...}, ...]` — sequence of point records.
    Records,
}

/// Detect which known shape `candidate` conforms to, if any. First rule that
/// matches wins; malformed input of any kind is simply `None`.
pub fn detect_shape(candidate: &Value) -> Option<CandidateShape> {
    match candidate {
        Value::Object(map) => {
            let array_valued =
                |key: &str| map.get(key).map(Value::is_array).unwrap_or(false);

            if array_valued("labels") && array_valued("data") {
                Some(CandidateShape::LabelsData)
            } else if map.contains_key("dates") && map.contains_key("prices") {
                Some(CandidateShape::DatesPrices)
            } else if map.contains_key("x") && map.contains_key("y") {
                Some(CandidateShape::Xy)
            } else {
                None
            }
        }
        Value::Array(items) => {
            let first = items.first()?.as_object()?;
            let has = |keys: &[&str]| keys.iter().any(|k| first.contains_key(*k));
            (has(&PRICE_KEYS) && has(&DATE_KEYS)).then_some(CandidateShape::Records)
        }
        _ => None,
    }
}

/// Does this value plausibly hold a price time series?
pub fn looks_like_price_series(candidate: &Value) -> bool {
    detect_shape(candidate).is_some()
}

/// Parse price out of a raw cell: strip everything except digits, dot, minus.
/// "₹ 1,234.56" → 1234.56 | "610.00" → 610.0
pub fn parse_price(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "-" || s == "—" {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_data_mapping_is_valid() {
        let v = json!({"labels": ["2023-01-01"], "data": [999]});
        assert_eq!(detect_shape(&v), Some(CandidateShape::LabelsData));
    }

    #[test]
    fn labels_data_requires_arrays() {
        let v = json!({"labels": "2023-01-01", "data": 999});
        assert_eq!(detect_shape(&v), None);
    }

    #[test]
    fn dates_prices_mapping_is_valid() {
        let v = json!({"dates": ["2023-01-01"], "prices": [999]});
        assert_eq!(detect_shape(&v), Some(CandidateShape::DatesPrices));
    }

    #[test]
    fn xy_mapping_is_valid() {
        let v = json!({"x": ["a"], "y": [1]});
        assert_eq!(detect_shape(&v), Some(CandidateShape::Xy));
    }

    #[test]
    fn record_sequence_is_valid() {
        let v = json!([{"time": "t1", "value": 10}]);
        assert_eq!(detect_shape(&v), Some(CandidateShape::Records));
    }

    #[test]
    fn labels_data_wins_over_xy() {
        let v = json!({"labels": [], "data": [], "x": [], "y": []});
        assert_eq!(detect_shape(&v), Some(CandidateShape::LabelsData));
    }

    #[test]
    fn rejects_non_price_shapes() {
        assert!(!looks_like_price_series(&json!({})));
        assert!(!looks_like_price_series(&json!([])));
        assert!(!looks_like_price_series(&json!([1, 2, 3])));
        assert!(!looks_like_price_series(&json!({"labels": []})));
        assert!(!looks_like_price_series(&json!({"prices": [1]})));
        assert!(!looks_like_price_series(&json!([{"price": 10}])));
        assert!(!looks_like_price_series(&json!(null)));
        assert!(!looks_like_price_series(&json!("labels")));
        assert!(!looks_like_price_series(&json!(42)));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("₹ 1,234.56"), Some(1234.56));
        assert_eq!(parse_price("610.00"), Some(610.0));
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("—"), None);
    }
}
