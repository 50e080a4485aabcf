//! Cache backend trait for pluggable caching stores.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A key-value store with per-entry expiry (Redis or in-process).
///
/// Values are serialized JSON strings. Any backend exposing
/// get / set-with-expiry is substitutable.
#[async_trait]
pub trait CacheBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value that expires `ttl` from now, replacing any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Short backend name used in logs.
    fn name(&self) -> &'static str;
}
