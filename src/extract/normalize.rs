//! Canonicalizes a validated candidate into the uniform `(date, price)` series.

use crate::extract::shape::{CandidateShape, DATE_KEYS, PRICE_KEYS, detect_shape, parse_price};
use crate::models::{PricePoint, PriceSeries};
use serde_json::Value;

/// Normalize a candidate into a price series. Undetectable shapes yield an
/// empty series — callers treat that as a declined extraction, never an error.
///
/// Axis-paired shapes (labels/data, dates/prices, x/y) pair by index and
/// truncate to the shorter array. Record sequences are lossy: records missing
/// a usable date or price key are dropped.
pub fn normalize(candidate: &Value) -> PriceSeries {
    match detect_shape(candidate) {
        Some(CandidateShape::LabelsData) => paired(candidate, "labels", "data"),
        Some(CandidateShape::DatesPrices) => paired(candidate, "dates", "prices"),
        // x/y is mapped positionally: x is assumed to be the date axis and y
        // the price axis. Assumption — no live payload of this shape has been
        // observed to confirm it.
        Some(CandidateShape::Xy) => paired(candidate, "x", "y"),
        Some(CandidateShape::Records) => records(candidate),
        None => Vec::new(),
    }
}

fn paired(candidate: &Value, date_key: &str, price_key: &str) -> PriceSeries {
    let dates = candidate.get(date_key).and_then(Value::as_array);
    let prices = candidate.get(price_key).and_then(Value::as_array);

    let (Some(dates), Some(prices)) = (dates, prices) else {
        return Vec::new();
    };

    dates
        .iter()
        .zip(prices.iter())
        .filter_map(|(d, p)| Some(PricePoint::new(label_of(d)?, price_of(p)?)))
        .collect()
}

fn records(candidate: &Value) -> PriceSeries {
    let Some(items) = candidate.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            let date = first_matching(map, &DATE_KEYS).and_then(label_of)?;
            let price = first_matching(map, &PRICE_KEYS).and_then(price_of)?;
            Some(PricePoint::new(date, price))
        })
        .collect()
}

/// First value whose key matches the set, case-insensitively.
fn first_matching<'a>(
    map: &'a serde_json::Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| keys.contains(&k.to_lowercase().as_str()))
        .map(|(_, v)| v)
}

fn label_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn price_of(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_data_preserves_length_and_order() {
        let v = json!({
            "labels": ["2023-01-01", "2023-01-08"],
            "data": [999, 949],
        });
        assert_eq!(
            normalize(&v),
            vec![
                PricePoint::new("2023-01-01", 999.0),
                PricePoint::new("2023-01-08", 949.0),
            ]
        );
    }

    #[test]
    fn mismatched_lengths_truncate_to_shorter() {
        let v = json!({
            "labels": ["d1", "d2", "d3", "d4", "d5"],
            "data": [1, 2, 3],
        });
        let series = normalize(&v);
        assert_eq!(series.len(), 3);
        assert_eq!(series[2], PricePoint::new("d3", 3.0));
    }

    #[test]
    fn dates_prices_renames_fields() {
        let v = json!({"dates": ["2024-05-01"], "prices": ["₹ 2,499"]});
        assert_eq!(normalize(&v), vec![PricePoint::new("2024-05-01", 2499.0)]);
    }

    #[test]
    fn record_sequence_drops_incomplete_records() {
        let v = json!([
            {"time": "t1", "value": 10},
            {"x": "t2"},
        ]);
        assert_eq!(normalize(&v), vec![PricePoint::new("t1", 10.0)]);
    }

    #[test]
    fn record_keys_match_case_insensitively() {
        let v = json!([{"Date": "2023-06-01", "Price": 777}]);
        assert_eq!(normalize(&v), vec![PricePoint::new("2023-06-01", 777.0)]);
    }

    // Positional x→date / y→price mapping is an assumption about this shape,
    // pinned here so a deliberate change shows up as a test failure.
    #[test]
    fn xy_maps_x_to_date_axis_by_assumption() {
        let v = json!({"x": ["2023-03-01"], "y": [123]});
        assert_eq!(normalize(&v), vec![PricePoint::new("2023-03-01", 123.0)]);
    }

    #[test]
    fn numeric_timestamps_become_labels() {
        let v = json!([{"timestamp": 1700000000, "amount": 15.5}]);
        assert_eq!(normalize(&v), vec![PricePoint::new("1700000000", 15.5)]);
    }

    #[test]
    fn unvalidated_shapes_normalize_to_empty() {
        assert!(normalize(&json!({"foo": 1})).is_empty());
        assert!(normalize(&json!([])).is_empty());
    }
}
