use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::catalog::CatalogClient;
use crate::constants::JWST_JPG_PATH;
use crate::normalize::{normalize_entry, SkipReason};
use crate::observability::metrics;
use crate::types::{FeedQuery, FeedResponse, NormalizedImageItem};

/// Use case for assembling one page of the image gallery feed
pub struct FeedUseCase {
    client: Arc<CatalogClient>,
}

impl FeedUseCase {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }

    /// Fetch one upstream page for `query` and normalize it.
    ///
    /// Upstream failures produce an empty feed, never an error.
    #[instrument(skip(self, query), fields(source = ?query.source, page = query.page))]
    pub async fn assemble(&self, query: &FeedQuery) -> FeedResponse {
        let query = query.clamped();
        let path = query.path();
        let raw = self
            .client
            .fetch(&path, &page_params(query.page, query.per_page))
            .await;

        let filter = query.instrument_filter();
        let items = assemble_items(&raw, filter.as_deref(), query.per_page as usize);

        metrics::feed::items_emitted(items.len());
        info!(path = %path, fetched = raw.len(), emitted = items.len(), "Assembled image feed");
        FeedResponse::new(path, items)
    }

    /// First record of the plain JPEG feed, used when nothing is featured
    pub async fn latest_record(&self) -> Option<Map<String, Value>> {
        let raw = self.client.fetch(JWST_JPG_PATH, &page_params(1, 1)).await;
        match raw.into_iter().next() {
            Some(Value::Object(record)) => Some(record),
            _ => None,
        }
    }
}

/// Paging query understood by the image catalog
pub fn page_params(page: i64, per_page: i64) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("perPage", per_page.to_string())]
}

/// Normalize raw entries in order, drop the unusable ones and stop at `limit`.
///
/// The limit applies to emitted items, so filtering happens before truncation.
pub fn assemble_items(
    raw: &[Value],
    instrument_filter: Option<&str>,
    limit: usize,
) -> Vec<NormalizedImageItem> {
    let mut items = Vec::with_capacity(limit.min(raw.len()));
    for entry in raw {
        if items.len() >= limit {
            break;
        }
        match normalize_entry(entry, instrument_filter) {
            Ok(item) => items.push(item),
            Err(reason) => record_skip(reason),
        }
    }
    items
}

fn record_skip(reason: SkipReason) {
    debug!(reason = reason.as_str(), "Skipping feed entry");
    metrics::feed::item_skipped(reason.as_str());
}
