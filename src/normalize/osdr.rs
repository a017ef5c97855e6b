use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::fields::{
    self, OSDR_DATASET_ID, OSDR_RAW, OSDR_REST_MARKERS, OSDR_REST_URL, OSDR_ROW_DATASET_ID,
    OSDR_TITLE,
};
use crate::constants::OSDR_ACCESSION_PREFIX;
use crate::types::OsdrRow;

const REST_URL_COLUMN: &str = "rest_url";

/// Columns a dictionary entry inherits from its parent row
const PARENT_COLUMNS: &[&str] = &["status", "updated_at", "inserted_at"];

/// Whether a row's `raw` payload is a dictionary of datasets keyed by accession
/// rather than a single dataset.
///
/// True when any key starts with `OSD-`, or any value is an object carrying a
/// `REST_URL`/`rest_url` field.
pub fn looks_like_dictionary(raw: &Map<String, Value>) -> bool {
    raw.iter().any(|(key, value)| {
        key.starts_with(OSDR_ACCESSION_PREFIX)
            || value
                .as_object()
                .is_some_and(|nested| fields::has_any(nested, OSDR_REST_MARKERS))
    })
}

/// Expand dictionary-shaped rows into one row per dataset.
///
/// Output follows input row order, then the dictionary's key order. Entries
/// that are not objects are dropped. Other rows pass through with every
/// column intact.
pub fn flatten(rows: &[Value]) -> Vec<OsdrRow> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(row) = row.as_object() else {
            debug!("Skipping dataset row that is not an object");
            continue;
        };

        match row.get(OSDR_RAW).and_then(Value::as_object) {
            Some(raw) if looks_like_dictionary(raw) => {
                let before = out.len();
                out.extend(
                    raw.iter()
                        .filter_map(|(key, value)| Some((key, value.as_object()?)))
                        .map(|(key, dataset)| dictionary_entry(row, key, dataset)),
                );
                debug!(datasets = out.len() - before, "Expanded dataset dictionary row");
            }
            raw => out.push(flat_row(row, raw)),
        }
    }
    out
}

/// Last path segment of a REST URL, ignoring trailing slashes
pub fn title_from_rest_url(rest_url: &str) -> Option<String> {
    rest_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn dictionary_entry(parent: &Map<String, Value>, key: &str, dataset: &Map<String, Value>) -> OsdrRow {
    let rest_url = rest_url(dataset);

    // An empty explicit title still yields to the REST_URL segment
    let explicit = fields::first_value(dataset, OSDR_TITLE);
    let title = match explicit {
        Some(title) if !is_blank(title) => title.clone(),
        _ => rest_url
            .as_str()
            .and_then(title_from_rest_url)
            .map(Value::String)
            .or_else(|| explicit.cloned())
            .unwrap_or(Value::Null),
    };

    let mut columns = Map::new();
    columns.insert("id".to_string(), column(parent, "id"));
    columns.insert("dataset_id".to_string(), Value::String(key.to_string()));
    columns.insert("title".to_string(), title);
    for name in PARENT_COLUMNS {
        columns.insert(name.to_string(), column(parent, name));
    }
    columns.insert(REST_URL_COLUMN.to_string(), rest_url);
    columns.insert(OSDR_RAW.to_string(), Value::Object(dataset.clone()));
    OsdrRow(columns)
}

fn flat_row(row: &Map<String, Value>, raw: Option<&Map<String, Value>>) -> OsdrRow {
    let mut columns = row.clone();
    columns.insert(
        REST_URL_COLUMN.to_string(),
        raw.map(rest_url).unwrap_or(Value::Null),
    );

    // Every row carries a dataset id; rows that already have one keep it as is
    if !fields::has_any(row, OSDR_ROW_DATASET_ID) {
        let derived = raw
            .and_then(|r| fields::first_string(r, OSDR_DATASET_ID))
            .or_else(|| fields::first_string(row, &["id"]))
            .unwrap_or_default();
        columns.insert("dataset_id".to_string(), Value::String(derived));
    }
    OsdrRow(columns)
}

fn rest_url(record: &Map<String, Value>) -> Value {
    fields::first_value(record, OSDR_REST_URL)
        .cloned()
        .unwrap_or(Value::Null)
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

fn column(row: &Map<String, Value>, key: &str) -> Value {
    row.get(key).cloned().unwrap_or(Value::Null)
}
