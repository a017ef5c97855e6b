use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::app::feed_use_case::FeedUseCase;
use crate::app::ports::SessionStorePort;
use crate::catalog::fields::{
    self, PROGRAM, SELECT_INSTRUMENTS, SELECT_LINK, SELECT_OBS_ID, SELECT_URL, SUFFIX,
};
use crate::constants::SELECTED_OBSERVATION_KEY;
use crate::error::Result;
use crate::normalize::featured_from_record;
use crate::observability::metrics;
use crate::types::FeaturedSelection;

/// Tracks the featured observation in caller-owned session state.
///
/// The slot is read-modify-write with last-writer-wins semantics; concurrent
/// selections from one session may race and the last one to finish is kept.
pub struct FeaturedUseCase {
    feed: Arc<FeedUseCase>,
    store: Arc<dyn SessionStorePort>,
}

impl FeaturedUseCase {
    pub fn new(feed: Arc<FeedUseCase>, store: Arc<dyn SessionStorePort>) -> Self {
        Self { feed, store }
    }

    /// Store a new featured observation.
    ///
    /// Returns `Ok(false)` and leaves the current selection alone when `obs_id`
    /// or `url` is missing. `Err` only comes from the session store.
    #[instrument(skip(self, data))]
    pub async fn select(&self, data: &Value) -> Result<bool> {
        let Some(selection) = selection_from_request(data) else {
            debug!("Rejected selection without observation id or url");
            metrics::selection::rejected();
            return Ok(false);
        };

        self.store
            .set(SELECTED_OBSERVATION_KEY, serde_json::to_value(&selection)?)
            .await?;
        metrics::selection::stored();
        info!(obs_id = %selection.observation_id, "Stored featured observation");
        Ok(true)
    }

    /// The stored selection, or the most recent image when nothing is stored
    #[instrument(skip(self))]
    pub async fn featured(&self) -> Result<Option<FeaturedSelection>> {
        if let Some(stored) = self.store.get(SELECTED_OBSERVATION_KEY).await? {
            match serde_json::from_value::<FeaturedSelection>(stored) {
                Ok(selection) => return Ok(Some(selection)),
                Err(e) => warn!("Ignoring malformed stored selection: {}", e),
            }
        }

        metrics::selection::fallback_used();
        let featured = self
            .feed
            .latest_record()
            .await
            .and_then(|record| featured_from_record(&record));
        if featured.is_none() {
            debug!("No featured observation available");
        }
        Ok(featured)
    }
}

/// Build a selection from a request map; `None` unless `obs_id` and `url` are present
pub fn selection_from_request(data: &Value) -> Option<FeaturedSelection> {
    let data = data.as_object()?;
    let observation_id = fields::first_string(data, SELECT_OBS_ID)?;
    let url = fields::first_str(data, SELECT_URL)?.to_string();

    let instruments = data
        .get(SELECT_INSTRUMENTS)
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(FeaturedSelection {
        link: fields::first_str(data, SELECT_LINK)
            .map(str::to_string)
            .unwrap_or_else(|| url.clone()),
        observation_id,
        program: fields::first_string(data, PROGRAM).unwrap_or_default(),
        suffix: fields::first_string(data, SUFFIX).unwrap_or_default(),
        instruments,
        url,
        ..FeaturedSelection::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{HttpClientPort, HttpGetResult};
    use crate::catalog::fields::JWST_LIST_ENVELOPE;
    use crate::catalog::CatalogClient;
    use crate::infra::session_store::InMemorySessionStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHttp {
        body: Value,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl HttpClientPort for CountingHttp {
        async fn get(&self, _url: &str) -> std::result::Result<HttpGetResult, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HttpGetResult {
                status: 200,
                bytes: serde_json::to_vec(&self.body).unwrap(),
                content_type: "application/json".to_string(),
            })
        }
    }

    fn tracker(body: Value) -> (FeaturedUseCase, Arc<InMemorySessionStore>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let http = Arc::new(CountingHttp {
            body,
            calls: calls.clone(),
        });
        let client = CatalogClient::new(http, "https://jwst.test", JWST_LIST_ENVELOPE).unwrap();
        let feed = Arc::new(FeedUseCase::new(Arc::new(client)));
        let store = Arc::new(InMemorySessionStore::new());
        (FeaturedUseCase::new(feed, store.clone()), store, calls)
    }

    #[tokio::test]
    async fn test_select_then_featured_skips_upstream() {
        let (tracker, _, calls) = tracker(json!([]));
        let accepted = tracker
            .select(&json!({"obs_id": "42", "url": "http://x/img.jpg"}))
            .await
            .unwrap();
        assert!(accepted);

        let featured = tracker.featured().await.unwrap().unwrap();
        assert_eq!(featured.observation_id, "42");
        assert_eq!(featured.url, "http://x/img.jpg");
        assert_eq!(featured.link, "http://x/img.jpg");
        assert!(featured.title.is_empty());
        assert!(featured.details.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_selection_keeps_previous() {
        let (tracker, store, _) = tracker(json!([]));
        tracker
            .select(&json!({"obs_id": "1", "url": "http://x/one.jpg"}))
            .await
            .unwrap();

        assert!(!tracker.select(&json!({"url": "http://x/img.jpg"})).await.unwrap());
        assert!(!tracker.select(&json!({"obs_id": "2", "url": ""})).await.unwrap());
        assert!(!tracker.select(&json!("not a map")).await.unwrap());

        let stored = store.get(SELECTED_OBSERVATION_KEY).await.unwrap().unwrap();
        assert_eq!(stored["obs_id"], json!("1"));
    }

    #[tokio::test]
    async fn test_new_selection_overwrites() {
        let (tracker, _, _) = tracker(json!([]));
        tracker
            .select(&json!({"obs_id": "1", "url": "http://x/one.jpg", "program": "100", "inst": ["MIRI"]}))
            .await
            .unwrap();
        tracker
            .select(&json!({"obs_id": "2", "url": "http://x/two.jpg", "link": "http://x/page"}))
            .await
            .unwrap();

        let featured = tracker.featured().await.unwrap().unwrap();
        assert_eq!(featured.observation_id, "2");
        assert_eq!(featured.link, "http://x/page");
        assert!(featured.program.is_empty());
        assert!(featured.instruments.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_to_latest_image() {
        let body = json!({"body": [{
            "observation_id": "jw01",
            "program": 1234,
            "location": "https://x/latest.png",
            "title": " Cosmic Cliffs ",
            "details": {"suffix": "_i2d", "instruments": [{"instrument": "nircam"}]}
        }]});
        let (tracker, _, calls) = tracker(body);

        let featured = tracker.featured().await.unwrap().unwrap();
        assert_eq!(featured.observation_id, "jw01");
        assert_eq!(featured.program, "1234");
        assert_eq!(featured.suffix, "_i2d");
        assert_eq!(featured.instruments, vec!["NIRCAM"]);
        assert_eq!(featured.title, "Cosmic Cliffs");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_selection_and_no_usable_fallback() {
        let (tracker, _, _) = tracker(json!({"body": [{"observation_id": "x", "url": "https://x/a.fits"}]}));
        assert_eq!(tracker.featured().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_stored_value_falls_back() {
        let (tracker, store, calls) = tracker(json!([]));
        store
            .set(SELECTED_OBSERVATION_KEY, json!("garbage"))
            .await
            .unwrap();
        assert_eq!(tracker.featured().await.unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_selection_from_request_accepts_numeric_obs_id() {
        let selection =
            selection_from_request(&json!({"obs_id": 42, "url": "http://x/a.jpg", "inst": ["MIRI", 3]}))
                .unwrap();
        assert_eq!(selection.observation_id, "42");
        assert_eq!(selection.instruments, vec!["MIRI"]);
    }
}
