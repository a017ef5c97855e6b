use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// Upstream-side ports
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<HttpGetResult, String>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Caller-owned key-value state (a web session, a state directory, ...).
///
/// Lifecycle and expiry belong to the implementation. Writes are
/// last-writer-wins with no concurrency control on this side.
#[async_trait]
pub trait SessionStorePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}
