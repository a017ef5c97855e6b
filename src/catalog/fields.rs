//! Field alias tables for the upstream catalogs.
//!
//! Upstream records are loosely shaped: the same concept shows up under
//! different keys depending on the catalog and endpoint. Every such concept is
//! listed here as an ordered alias chain; lookups try each alias in turn and
//! return the first usable value.

use serde_json::{Map, Value};

/// Direct image candidates on an image record
pub const IMAGE_URL: &[&str] = &["location", "url"];
pub const THUMBNAIL: &[&str] = &["thumbnail"];

/// Image-ish keys checked first by the secondary scan
pub const IMAGE_HINTS: &[&str] = &["image", "image_url", "imageUrl", "file_url", "preview"];

pub const OBSERVATION_ID: &[&str] = &["observation_id", "observationId"];
/// Identifier shown in a caption; falls back to the record id
pub const CAPTION_ID: &[&str] = &["observation_id", "observationId", "id"];
pub const PROGRAM: &[&str] = &["program"];
pub const SUFFIX: &[&str] = &["suffix"];
pub const LINK: &[&str] = &["location"];
pub const TITLE: &[&str] = &["title"];
pub const DESCRIPTION: &[&str] = &["description"];

pub const DETAILS: &str = "details";
pub const INSTRUMENTS: &str = "instruments";
pub const INSTRUMENT: &str = "instrument";

/// Selection request keys
pub const SELECT_OBS_ID: &[&str] = &["obs_id"];
pub const SELECT_URL: &[&str] = &["url"];
pub const SELECT_LINK: &[&str] = &["link"];
pub const SELECT_INSTRUMENTS: &str = "inst";

/// Dataset catalog keys
pub const OSDR_REST_URL: &[&str] = &["REST_URL", "rest_url", "rest"];
/// Keys whose presence marks a nested dataset record
pub const OSDR_REST_MARKERS: &[&str] = &["REST_URL", "rest_url"];
pub const OSDR_TITLE: &[&str] = &["title", "name"];
pub const OSDR_DATASET_ID: &[&str] = &["dataset_id", "id", "uuid", "studyId", "accession", "osdr_id"];
pub const OSDR_ROW_DATASET_ID: &[&str] = &["dataset_id"];
pub const OSDR_RAW: &str = "raw";

/// Where a response payload keeps its record list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEnvelope {
    /// Keys that may wrap the list, in priority order
    pub keys: &'static [&'static str],
    /// Read an object holding none of `keys` as a map of records
    pub values_fallback: bool,
}

pub const JWST_LIST_ENVELOPE: ListEnvelope = ListEnvelope {
    keys: &["body", "data"],
    values_fallback: true,
};
pub const OSDR_LIST_ENVELOPE: ListEnvelope = ListEnvelope {
    keys: &["items"],
    values_fallback: false,
};

/// First alias holding a non-null value
pub fn first_value<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// First alias holding a non-empty string, or a number rendered as text
pub fn first_string(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(scalar_text)
}

/// First alias holding a non-empty string; numbers do not count
pub fn first_str<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
}

/// Whether any alias is present with a non-null value
pub fn has_any(record: &Map<String, Value>, aliases: &[&str]) -> bool {
    first_value(record, aliases).is_some()
}

/// The record's `details` object, if it has one
pub fn details(record: &Map<String, Value>) -> Option<&Map<String, Value>> {
    record.get(DETAILS).and_then(Value::as_object)
}

/// Suffix from `details.suffix`, then the top-level `suffix`
pub fn suffix(record: &Map<String, Value>) -> Option<String> {
    details(record)
        .and_then(|d| first_string(d, SUFFIX))
        .or_else(|| first_string(record, SUFFIX))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
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
    fn test_first_string_skips_empty_and_null() {
        let r = record(json!({"observation_id": "", "observationId": null, "id": 17}));
        assert_eq!(first_string(&r, CAPTION_ID), Some("17".to_string()));
    }

    #[test]
    fn test_first_str_ignores_numbers() {
        let r = record(json!({"title": 5, "name": "Rodent Research"}));
        assert_eq!(first_str(&r, OSDR_TITLE), Some("Rodent Research"));
    }

    #[test]
    fn test_suffix_prefers_details() {
        let r = record(json!({"suffix": "_top", "details": {"suffix": "_cal"}}));
        assert_eq!(suffix(&r), Some("_cal".to_string()));

        let r = record(json!({"suffix": "_top", "details": {"suffix": ""}}));
        assert_eq!(suffix(&r), Some("_top".to_string()));
    }

    #[test]
    fn test_has_any() {
        let r = record(json!({"rest_url": "https://x/y"}));
        assert!(has_any(&r, OSDR_REST_MARKERS));
        assert!(!has_any(&r, TITLE));
    }
}
