use std::sync::Arc;

use serde_json::Value;

use crate::app::featured_use_case::FeaturedUseCase;
use crate::app::feed_use_case::FeedUseCase;
use crate::app::osdr_use_case::OsdrUseCase;
use crate::app::ports::{HttpClientPort, SessionStorePort};
use crate::catalog::fields::{JWST_LIST_ENVELOPE, OSDR_LIST_ENVELOPE};
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::error::Result;
use crate::infra::http_client::ReqwestHttp;
use crate::types::{FeaturedSelection, FeedQuery, FeedResponse, OsdrListResponse};

/// Entry point for routing code: `feed`, `featured`, `select`, `osdr_list`
pub struct CatalogService {
    feed: Arc<FeedUseCase>,
    featured: FeaturedUseCase,
    osdr: OsdrUseCase,
    default_osdr_limit: u32,
}

impl CatalogService {
    /// Wire explicit HTTP ports, one per upstream
    pub fn new(
        config: &Config,
        jwst_http: Arc<dyn HttpClientPort>,
        osdr_http: Arc<dyn HttpClientPort>,
        store: Arc<dyn SessionStorePort>,
    ) -> Result<Self> {
        let jwst = Arc::new(CatalogClient::new(
            jwst_http,
            &config.jwst.base_url,
            JWST_LIST_ENVELOPE,
        )?);
        let osdr = Arc::new(CatalogClient::new(
            osdr_http,
            &config.osdr.base_url,
            OSDR_LIST_ENVELOPE,
        )?);

        let feed = Arc::new(FeedUseCase::new(jwst));
        Ok(Self {
            featured: FeaturedUseCase::new(feed.clone(), store),
            feed,
            osdr: OsdrUseCase::new(osdr),
            default_osdr_limit: config.osdr.list_limit,
        })
    }

    /// Wire reqwest clients built from `config`
    pub fn from_config(config: &Config, store: Arc<dyn SessionStorePort>) -> Result<Self> {
        let jwst_http = Arc::new(ReqwestHttp::new(&config.http, config.jwst.api_key.as_deref())?);
        let osdr_http = Arc::new(ReqwestHttp::new(&config.http, None)?);
        Self::new(config, jwst_http, osdr_http, store)
    }

    pub async fn feed(&self, query: &FeedQuery) -> FeedResponse {
        self.feed.assemble(query).await
    }

    pub async fn featured(&self) -> Result<Option<FeaturedSelection>> {
        self.featured.featured().await
    }

    pub async fn select(&self, data: &Value) -> Result<bool> {
        self.featured.select(data).await
    }

    /// Dataset list; `None` uses the configured limit
    pub async fn osdr_list(&self, limit: Option<u32>) -> OsdrListResponse {
        self.osdr
            .list(limit.unwrap_or(self.default_osdr_limit))
            .await
    }
}
