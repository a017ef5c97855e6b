use crate::constants::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, JWST_JPG_PATH, JWST_PROGRAM_PATH_PREFIX,
    JWST_SUFFIX_PATH_PREFIX, MAX_PER_PAGE, MIN_PER_PAGE,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Untyped record as returned by an upstream catalog
pub type RawRecord = Map<String, Value>;

/// One displayable image of the feed.
///
/// Serialized with the short keys the gallery front-end reads (`obs`, `inst`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedImageItem {
    /// Always ends in `.jpg`, `.jpeg` or `.png` (optionally followed by a query)
    pub url: String,
    #[serde(rename = "obs")]
    pub observation_id: String,
    pub program: String,
    pub suffix: String,
    #[serde(rename = "inst")]
    pub instruments: Vec<String>,
    pub caption: String,
    pub link: String,
}

/// The single highlighted observation kept in the caller's session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturedSelection {
    pub url: String,
    #[serde(rename = "obs_id")]
    pub observation_id: String,
    pub program: String,
    pub suffix: String,
    pub instruments: Vec<String>,
    pub title: String,
    pub description: String,
    pub link: String,
    pub details: Map<String, Value>,
}

/// A dataset catalog row after dictionary flattening.
///
/// Flat upstream rows keep every column exactly as received (plus
/// `rest_url`), so the row is a column map and the accessors read the columns
/// both row shapes share.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OsdrRow(pub Map<String, Value>);

static NULL: Value = Value::Null;

impl OsdrRow {
    /// Column value, `Null` when the column is absent
    pub fn column(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&NULL)
    }

    pub fn id(&self) -> &Value {
        self.column("id")
    }

    /// Dataset id as text; numbers are rendered, anything else reads as empty
    pub fn dataset_id(&self) -> String {
        match self.column("dataset_id") {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.column("title").as_str()
    }

    pub fn rest_url(&self) -> Option<&str> {
        self.column("rest_url").as_str()
    }

    pub fn status(&self) -> &Value {
        self.column("status")
    }

    pub fn raw(&self) -> &Value {
        self.column("raw")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    #[default]
    Jpg,
    Suffix,
    Program,
}

impl FeedSource {
    /// Unknown values fall back to the plain JPEG feed
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "suffix" => FeedSource::Suffix,
            "program" => FeedSource::Program,
            _ => FeedSource::Jpg,
        }
    }
}

/// Deserializes through [`FeedSource::parse`], so unknown values read as `jpg`
impl<'de> Deserialize<'de> for FeedSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(FeedSource::parse(&value))
    }
}

/// Parameters of one feed page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedQuery {
    pub source: FeedSource,
    pub suffix: String,
    pub program: String,
    pub instrument: String,
    pub page: i64,
    pub per_page: i64,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            source: FeedSource::Jpg,
            suffix: String::new(),
            program: String::new(),
            instrument: String::new(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl FeedQuery {
    pub fn new(source: FeedSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instrument = instrument.into();
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = per_page;
        self
    }

    /// Build a query from a raw query-string map.
    ///
    /// Text values are trimmed, numbers are read leniently (a value with no
    /// leading digits reads as 0 and is clamped later), and a missing
    /// `perPage` means the default page size.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let text = |key: &str| params.get(key).map(|v| v.trim().to_string()).unwrap_or_default();

        Self {
            source: params
                .get("source")
                .map(|s| FeedSource::parse(s))
                .unwrap_or_default(),
            suffix: text("suffix"),
            program: text("program"),
            instrument: text("instrument"),
            page: params.get("page").map(|v| parse_leading_int(v)).unwrap_or(DEFAULT_PAGE),
            per_page: params
                .get("perPage")
                .map(|v| parse_leading_int(v))
                .unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    /// Copy with `page >= 1` and `per_page` inside `[1, 60]`
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(MIN_PER_PAGE, MAX_PER_PAGE),
            ..self.clone()
        }
    }

    /// Upper-cased instrument filter, `None` when unset
    pub fn instrument_filter(&self) -> Option<String> {
        let filter = self.instrument.trim().to_uppercase();
        (!filter.is_empty()).then_some(filter)
    }

    /// Upstream path for this query's source mode
    pub fn path(&self) -> String {
        let suffix = self.suffix.trim();
        let program = self.program.trim();
        match self.source {
            FeedSource::Suffix if !suffix.is_empty() => {
                format!("{}{}", JWST_SUFFIX_PATH_PREFIX, suffix.trim_start_matches('/'))
            }
            FeedSource::Program if !program.is_empty() => {
                format!("{}{}", JWST_PROGRAM_PATH_PREFIX, encode_path_segment(program))
            }
            _ => JWST_JPG_PATH.to_string(),
        }
    }
}

/// Result of one feed assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    /// Upstream path the page came from
    pub source: String,
    pub count: usize,
    pub items: Vec<NormalizedImageItem>,
}

impl FeedResponse {
    pub fn new(source: String, items: Vec<NormalizedImageItem>) -> Self {
        Self {
            source,
            count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsdrListResponse {
    pub items: Vec<OsdrRow>,
    /// Full URL the rows were read from
    pub src: String,
}

/// Percent-encode a single path segment, keeping only RFC 3986 unreserved characters
pub fn encode_path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Read an optional sign and leading digits; anything else reads as 0
fn parse_leading_int(value: &str) -> i64 {
    let value = value.trim_start();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let parsed = digits[..end].parse::<i64>().unwrap_or(0);
    if negative {
        -parsed
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_query_uses_jpg_path() {
        let query = FeedQuery::default();
        assert_eq!(query.path(), "all/type/jpg");
        assert_eq!(query.per_page, 24);
    }

    #[test]
    fn test_suffix_path_strips_leading_slash() {
        let query = FeedQuery::new(FeedSource::Suffix).with_suffix(" /_cal ");
        assert_eq!(query.path(), "all/suffix/_cal");
    }

    #[test]
    fn test_empty_suffix_falls_back_to_jpg() {
        let query = FeedQuery::new(FeedSource::Suffix).with_suffix("   ");
        assert_eq!(query.path(), "all/type/jpg");
    }

    #[test]
    fn test_program_path_is_encoded() {
        assert_eq!(
            FeedQuery::new(FeedSource::Program).with_program("2734").path(),
            "program/id/2734"
        );
        assert_eq!(
            FeedQuery::new(FeedSource::Program).with_program("a b/c~").path(),
            "program/id/a%20b%2Fc~"
        );
    }

    #[test]
    fn test_program_ignored_for_other_sources() {
        let query = FeedQuery::new(FeedSource::Jpg).with_program("2734");
        assert_eq!(query.path(), "all/type/jpg");
    }

    #[test]
    fn test_clamping() {
        let query = FeedQuery::default().with_page(-3).with_per_page(500).clamped();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 60);

        let query = FeedQuery::default().with_per_page(0).clamped();
        assert_eq!(query.per_page, 1);
    }

    #[test]
    fn test_from_params_is_lenient() {
        let query = FeedQuery::from_params(&params(&[
            ("source", "program"),
            ("program", " 2734 "),
            ("instrument", " nircam "),
            ("page", "3abc"),
            ("perPage", "abc"),
        ]));
        assert_eq!(query.source, FeedSource::Program);
        assert_eq!(query.program, "2734");
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 0);
        assert_eq!(query.clamped().per_page, 1);
        assert_eq!(query.instrument_filter().as_deref(), Some("NIRCAM"));
    }

    #[test]
    fn test_from_params_defaults() {
        let query = FeedQuery::from_params(&params(&[("source", "bogus")]));
        assert_eq!(query.source, FeedSource::Jpg);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 24);
        assert_eq!(query.instrument_filter(), None);
    }

    #[test]
    fn test_deserialized_source_matches_parse() {
        let query: FeedQuery =
            serde_json::from_value(json!({"source": "telescope", "perPage": 12})).unwrap();
        assert_eq!(query.source, FeedSource::Jpg);
        assert_eq!(query.per_page, 12);

        let query: FeedQuery = serde_json::from_value(json!({"source": " program "})).unwrap();
        assert_eq!(query.source, FeedSource::parse(" program "));
        assert_eq!(query.source, FeedSource::Program);
    }

    #[test]
    fn test_feed_response_count_matches_items() {
        let response = FeedResponse::new("all/type/jpg".to_string(), Vec::new());
        assert_eq!(response.count, 0);
    }
}
