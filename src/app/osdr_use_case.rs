use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::catalog::CatalogClient;
use crate::catalog::fields::OSDR_RAW;
use crate::constants::OSDR_LIST_PATH;
use crate::normalize::{flatten, looks_like_dictionary};
use crate::observability::metrics;
use crate::types::OsdrListResponse;

/// Use case for listing datasets with dictionary rows flattened
pub struct OsdrUseCase {
    client: Arc<CatalogClient>,
}

impl OsdrUseCase {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, limit: u32) -> OsdrListResponse {
        let query = [("limit", limit.to_string())];
        let src = self
            .client
            .build_url(OSDR_LIST_PATH, &query)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| {
                format!("{}/{}?limit={}", self.client.base_url(), OSDR_LIST_PATH, limit)
            });

        let rows = self.client.fetch(OSDR_LIST_PATH, &query).await;
        let dictionary_rows = rows.iter().filter(|row| is_dictionary_row(row)).count();
        let items = flatten(&rows);

        metrics::osdr::dictionary_rows(dictionary_rows);
        metrics::osdr::rows_flattened(items.len());
        info!(
            fetched = rows.len(),
            dictionary_rows,
            emitted = items.len(),
            "Listed datasets"
        );
        OsdrListResponse { items, src }
    }
}

fn is_dictionary_row(row: &Value) -> bool {
    row.get(OSDR_RAW)
        .and_then(Value::as_object)
        .is_some_and(looks_like_dictionary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{HttpClientPort, HttpGetResult};
    use crate::catalog::fields::OSDR_LIST_ENVELOPE;
    use async_trait::async_trait;
    use serde_json::json;

    struct MockHttp {
        status: u16,
        body: Value,
    }

    #[async_trait]
    impl HttpClientPort for MockHttp {
        async fn get(&self, _url: &str) -> std::result::Result<HttpGetResult, String> {
            Ok(HttpGetResult {
                status: self.status,
                bytes: serde_json::to_vec(&self.body).unwrap(),
                content_type: "application/json".to_string(),
            })
        }
    }

    fn use_case(status: u16, body: Value) -> OsdrUseCase {
        let http = Arc::new(MockHttp { status, body });
        let client = CatalogClient::new(http, "http://rust_iss:3000", OSDR_LIST_ENVELOPE).unwrap();
        OsdrUseCase::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_list_flattens_items_envelope() {
        let osdr = use_case(
            200,
            json!({"items": [
                {"id": 1, "dataset_id": "OSD-100", "title": "Flat", "raw": {"REST_URL": "https://x/OSD-100"}},
                {"id": 2, "raw": {"OSD-1": {"title": "A"}, "OSD-2": {"REST_URL": "https://x/y/OSD-2/"}}}
            ]}),
        );
        let response = osdr.list(20).await;
        assert_eq!(response.src, "http://rust_iss:3000/osdr/list?limit=20");
        let ids: Vec<String> = response.items.iter().map(|r| r.dataset_id()).collect();
        assert_eq!(ids, vec!["OSD-100", "OSD-1", "OSD-2"]);
        assert_eq!(response.items[2].title(), Some("OSD-2"));
        assert_eq!(response.items[0].rest_url(), Some("https://x/OSD-100"));
    }

    #[tokio::test]
    async fn test_list_degrades_to_empty_on_failure() {
        let osdr = use_case(500, json!({"error": "boom"}));
        let response = osdr.list(5).await;
        assert!(response.items.is_empty());
        assert_eq!(response.src, "http://rust_iss:3000/osdr/list?limit=5");
    }

    #[test]
    fn test_is_dictionary_row() {
        assert!(is_dictionary_row(&json!({"raw": {"OSD-1": {}}})));
        assert!(!is_dictionary_row(&json!({"raw": {"title": "x"}})));
        assert!(!is_dictionary_row(&json!({"id": 1})));
    }
}
