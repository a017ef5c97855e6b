use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::catalog::fields::{self, IMAGE_HINTS, IMAGE_URL, THUMBNAIL};

static IMAGE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png)(\?.*)?$").expect("valid image extension regex"));

/// How deep the fallback scan descends into nested objects and arrays
const MAX_SCAN_DEPTH: usize = 6;

pub fn is_image_url(candidate: &str) -> bool {
    IMAGE_EXTENSION.is_match(candidate)
}

/// Pick one displayable image URL for a record.
///
/// Order: `location`, `url`, `thumbnail`, then the fallback scan described on
/// [`scan_for_image`]. Never touches the network.
pub fn resolve(item: &Map<String, Value>) -> Option<String> {
    IMAGE_URL
        .iter()
        .chain(THUMBNAIL)
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find(|candidate| is_image_url(candidate))
        .map(str::to_string)
        .or_else(|| scan_for_image(item))
}

/// Fallback pass over the whole record.
///
/// 1. image-ish keys (`image`, `image_url`, ...) at the top level
/// 2. the `details` object, depth-first in key order
/// 3. every other top-level field, depth-first in key order
///
/// Arrays are walked in element order. The first string matching the image
/// extension pattern wins.
pub fn scan_for_image(item: &Map<String, Value>) -> Option<String> {
    if let Some(hit) = IMAGE_HINTS
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find(|candidate| is_image_url(candidate))
    {
        return Some(hit.to_string());
    }

    if let Some(hit) = item.get(fields::DETAILS).and_then(|d| scan_value(d, 0)) {
        return Some(hit);
    }

    item.iter()
        .filter(|(key, _)| key.as_str() != fields::DETAILS)
        .find_map(|(_, value)| scan_value(value, 0))
}

fn scan_value(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_SCAN_DEPTH {
        return None;
    }
    match value {
        Value::String(s) if is_image_url(s) => Some(s.clone()),
        Value::Array(list) => list.iter().find_map(|v| scan_value(v, depth + 1)),
        Value::Object(map) => map.values().find_map(|v| scan_value(v, depth + 1)),
        _ => None,
    }
}
