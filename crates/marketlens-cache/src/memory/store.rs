//! In-memory cache implementation using a sharded concurrent map.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use marketlens_core::result::AppResult;
use marketlens_core::traits::{CacheBackend, Clock, SystemClock};

/// A stored value and the instant (epoch ms) it stops being fresh.
#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at_ms: i64,
}

/// Process-local cache backend.
///
/// Expiry is lazy: stale entries are ignored on read but stay in the map
/// until overwritten. Entries do not survive a restart and are not shared
/// across processes.
#[derive(Debug, Clone)]
pub struct MemoryCacheBackend {
    entries: Arc<DashMap<String, MemoryEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCacheBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCacheBackend {
    /// Create an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store that reads time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = self.clock.now_ms();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| now < entry.expires_at_ms)
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let expires_at_ms = self
            .clock
            .now_ms()
            .saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketlens_core::traits::ManualClock;

    fn make_backend() -> (MemoryCacheBackend, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        (MemoryCacheBackend::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_set_get() {
        let (backend, _) = make_backend();
        backend
            .set("stock_quote_AAPL", "{\"value\":150.25}", Duration::from_secs(300))
            .await
            .unwrap();
        let val = backend.get("stock_quote_AAPL").await.unwrap();
        assert_eq!(val.as_deref(), Some("{\"value\":150.25}"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let (backend, _) = make_backend();
        assert_eq!(backend.get("macro_GDP").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lazy_expiry() {
        let (backend, clock) = make_backend();
        backend
            .set("timeseries_MSFT", "[]", Duration::from_millis(1_000))
            .await
            .unwrap();

        clock.advance(Duration::from_millis(999));
        assert!(backend.get("timeseries_MSFT").await.unwrap().is_some());

        // Fresh iff now < stored_at + ttl, so the boundary itself is stale.
        clock.advance(Duration::from_millis(1));
        assert!(backend.get("timeseries_MSFT").await.unwrap().is_none());

        // Stale entries are not evicted.
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_resets_expiry() {
        let (backend, clock) = make_backend();
        backend
            .set("k", "v1", Duration::from_millis(100))
            .await
            .unwrap();
        clock.advance(Duration::from_millis(150));
        backend
            .set("k", "v2", Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (backend, _) = make_backend();
        assert!(backend.health_check().await.unwrap());
        assert_eq!(backend.name(), "memory");
    }
}
