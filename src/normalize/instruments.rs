use serde_json::{Map, Value};

use crate::catalog::fields::{self, INSTRUMENT, INSTRUMENTS};

/// Upper-cased instrument names from `details.instruments[*].instrument`.
///
/// Order is preserved and duplicates are kept. Entries that are not objects,
/// or whose `instrument` is not a non-empty string, are ignored.
pub fn extract(item: &Map<String, Value>) -> Vec<String> {
    fields::details(item)
        .and_then(|details| details.get(INSTRUMENTS))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|entry| entry.get(INSTRUMENT).and_then(Value::as_str))
                .filter(|name| !name.is_empty())
                .map(str::to_uppercase)
                .collect()
        })
        .unwrap_or_default()
}

/// Whether an item passes the instrument filter.
///
/// Items without instruments always pass.
pub fn matches_filter(instruments: &[String], filter: Option<&str>) -> bool {
    match filter {
        Some(wanted) if !instruments.is_empty() => instruments.iter().any(|i| i == wanted),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_extract_uppercases_in_order() {
        let r = record(json!({"details": {"instruments": [
            {"instrument": "NIRCam"},
            {"instrument": "miri"},
            {"instrument": "NIRCam"}
        ]}}));
        assert_eq!(extract(&r), vec!["NIRCAM", "MIRI", "NIRCAM"]);
    }

    #[test]
    fn test_extract_skips_malformed_entries() {
        let r = record(json!({"details": {"instruments": [
            "NIRSPEC",
            {"instrument": ""},
            {"instrument": 7},
            {"name": "FGS"},
            {"instrument": "niriss"}
        ]}}));
        assert_eq!(extract(&r), vec!["NIRISS"]);
    }

    #[test]
    fn test_extract_missing_structure() {
        assert!(extract(&record(json!({}))).is_empty());
        assert!(extract(&record(json!({"details": []}))).is_empty());
        assert!(extract(&record(json!({"details": {"instruments": {"instrument": "MIRI"}}}))).is_empty());
        assert!(extract(&record(json!({"instruments": [{"instrument": "MIRI"}]}))).is_empty());
    }

    #[test]
    fn test_filter_is_inclusive_of_empty_lists() {
        assert!(matches_filter(&[], Some("MIRI")));
        assert!(matches_filter(&["NIRCAM".to_string()], None));
        assert!(matches_filter(&["NIRCAM".to_string(), "MIRI".to_string()], Some("MIRI")));
        assert!(!matches_filter(&["NIRCAM".to_string()], Some("MIRI")));
    }
}
