use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::app::ports::HttpClientPort;
use crate::catalog::fields::ListEnvelope;
use crate::error::{CatalogError, Result, UpstreamError};
use crate::observability::metrics;

/// Fetches pages of raw records from one upstream catalog.
///
/// The response body may be a bare list or a list wrapped under one of the
/// envelope keys; see [`extract_list`].
pub struct CatalogClient {
    http: Arc<dyn HttpClientPort>,
    base: Url,
    envelope: ListEnvelope,
}

impl CatalogClient {
    pub fn new(
        http: Arc<dyn HttpClientPort>,
        base_url: &str,
        envelope: ListEnvelope,
    ) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(CatalogError::Config("upstream base URL is empty".to_string()));
        }
        // Trailing slash so relative paths append instead of replacing the last segment
        let base = Url::parse(&format!("{}/", trimmed))?;
        Ok(Self {
            http,
            base,
            envelope,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Join `path` onto the base address and append `query` in order
    pub fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Fetch one page, reporting why nothing came back
    #[instrument(skip(self, query), fields(base = %self.base))]
    pub async fn try_fetch(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<Vec<Value>, UpstreamError> {
        let url = self
            .build_url(path, query)
            .map_err(|e| UpstreamError::Transport {
                url: path.to_string(),
                message: e.to_string(),
            })?;

        let started = Instant::now();
        let response = self
            .http
            .get(url.as_str())
            .await
            .map_err(|message| UpstreamError::Transport {
                url: url.to_string(),
                message,
            })?;
        metrics::upstream::request_duration(started.elapsed().as_secs_f64());

        if !response.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let payload: Value =
            serde_json::from_slice(&response.bytes).map_err(|e| UpstreamError::Body {
                url: url.to_string(),
                message: format!("{} (content-type {})", e, response.content_type),
            })?;

        let records = extract_list(payload, self.envelope);
        debug!(url = %url, records = records.len(), "Fetched upstream page");
        Ok(records)
    }

    /// Fetch one page; an unavailable upstream reads as an empty page
    pub async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Vec<Value> {
        match self.try_fetch(path, query).await {
            Ok(records) => {
                metrics::upstream::request_success(records.len());
                records
            }
            Err(e) => {
                warn!(reason = e.reason(), "Upstream catalog unavailable: {}", e);
                metrics::upstream::request_error(e.reason());
                Vec::new()
            }
        }
    }
}

/// Pull the record list out of a response payload.
///
/// The first envelope key holding a list wins. A bare list payload is used as
/// is. An object without such a key yields its values when the envelope allows
/// it and nothing otherwise; scalars yield nothing.
pub fn extract_list(payload: Value, envelope: ListEnvelope) -> Vec<Value> {
    match payload {
        Value::Array(list) => list,
        Value::Object(mut map) => {
            let wrapper = envelope
                .keys
                .iter()
                .find(|key| matches!(map.get(**key), Some(Value::Array(_))));
            match wrapper.and_then(|key| map.remove(*key)) {
                Some(Value::Array(list)) => list,
                _ if envelope.values_fallback => map.into_iter().map(|(_, value)| value).collect(),
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}
