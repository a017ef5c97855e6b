use serde_json::{Map, Value};

use crate::catalog::fields::{self, CAPTION_ID, DESCRIPTION, LINK, OBSERVATION_ID, PROGRAM, TITLE};
use crate::normalize::{image_url, instruments};
use crate::types::{FeaturedSelection, NormalizedImageItem};

const CAPTION_SEPARATOR: &str = " · ";

/// Why a raw feed entry produced no item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotRecord,
    NoImage,
    InstrumentFilter,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotRecord => "not_record",
            SkipReason::NoImage => "no_image",
            SkipReason::InstrumentFilter => "instrument_filter",
        }
    }
}

/// Turn one raw feed entry into a gallery item, or say why it was dropped
pub fn normalize_entry(
    entry: &Value,
    instrument_filter: Option<&str>,
) -> Result<NormalizedImageItem, SkipReason> {
    let record = entry.as_object().ok_or(SkipReason::NotRecord)?;
    let url = image_url::resolve(record).ok_or(SkipReason::NoImage)?;
    let instrument_list = instruments::extract(record);
    if !instruments::matches_filter(&instrument_list, instrument_filter) {
        return Err(SkipReason::InstrumentFilter);
    }

    let program = fields::first_string(record, PROGRAM);
    let suffix = fields::suffix(record);
    let caption = caption(
        fields::first_string(record, CAPTION_ID).as_deref(),
        program.as_deref(),
        suffix.as_deref(),
        &instrument_list,
    );

    Ok(NormalizedImageItem {
        link: link(record, &url),
        observation_id: fields::first_string(record, OBSERVATION_ID).unwrap_or_default(),
        program: program.unwrap_or_default(),
        suffix: suffix.unwrap_or_default(),
        instruments: instrument_list,
        caption,
        url,
    })
}

/// Featured selection synthesized from a raw image record
pub fn featured_from_record(record: &Map<String, Value>) -> Option<FeaturedSelection> {
    let url = image_url::resolve(record)?;
    Some(FeaturedSelection {
        link: link(record, &url),
        observation_id: fields::first_string(record, OBSERVATION_ID).unwrap_or_default(),
        program: fields::first_string(record, PROGRAM).unwrap_or_default(),
        suffix: fields::suffix(record).unwrap_or_default(),
        instruments: instruments::extract(record),
        title: trimmed(record, TITLE),
        description: trimmed(record, DESCRIPTION),
        details: fields::details(record).cloned().unwrap_or_default(),
        url,
    })
}

/// `id · P<program> · suffix · INST/INST`, leaving out absent parts
pub fn caption(
    id: Option<&str>,
    program: Option<&str>,
    suffix: Option<&str>,
    instrument_list: &[String],
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);
    if let Some(id) = id.filter(|s| !s.is_empty()) {
        parts.push(id.to_string());
    }
    parts.push(format!("P{}", program.filter(|p| !p.is_empty()).unwrap_or("-")));
    if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
        parts.push(suffix.to_string());
    }
    if !instrument_list.is_empty() {
        parts.push(instrument_list.join("/"));
    }
    parts.join(CAPTION_SEPARATOR).trim().to_string()
}

fn link(record: &Map<String, Value>, url: &str) -> String {
    fields::first_str(record, LINK)
        .map(str::to_string)
        .unwrap_or_else(|| url.to_string())
}

fn trimmed(record: &Map<String, Value>, aliases: &[&str]) -> String {
    fields::first_str(record, aliases)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
