//! Cache manager that selects between the networked and in-process backends.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use marketlens_core::config::cache::CacheConfig;
use marketlens_core::error::AppError;
use marketlens_core::result::AppResult;
use marketlens_core::traits::CacheBackend;

use crate::memory::MemoryCacheBackend;

/// Which backend currently serves cache traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote key-value store (Redis).
    Networked,
    /// Process-local map.
    Local,
}

impl BackendKind {
    /// Lowercase name for logs and health output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Networked => "networked",
            Self::Local => "local",
        }
    }
}

/// Outcome of a raw cache read.
#[derive(Debug)]
pub enum CacheRead {
    /// A fresh serialized value.
    Hit(String),
    /// Nothing stored, or the entry expired.
    Miss,
    /// The networked backend failed; the manager has already downgraded.
    BackendFailed(AppError),
}

/// Outcome of a raw cache write.
#[derive(Debug)]
pub enum CacheWrite {
    /// The value was stored.
    Stored,
    /// The networked backend failed and the write was dropped; the manager
    /// has already downgraded.
    BackendFailed(AppError),
}

/// Read-through cache shared by every request handler.
///
/// Starts on the networked backend when one is available. The first error
/// it raises (read, write, or an undecodable payload) switches the manager
/// to the in-process backend for the rest of its lifetime. Callers never see
/// backend errors: a failing cache looks like an empty cache.
#[derive(Debug)]
pub struct CacheManager {
    networked: Option<Arc<dyn CacheBackend>>,
    local: MemoryCacheBackend,
    degraded: AtomicBool,
}

impl CacheManager {
    /// Create a cache manager from configuration.
    ///
    /// Never fails: an unreachable Redis at startup is logged and the manager
    /// starts in-process.
    pub async fn new(config: &CacheConfig) -> Self {
        let networked = match config.networked_url() {
            Some(url) => connect_networked(url, &config.key_prefix).await,
            None => {
                info!("No Redis URL configured; using in-process cache");
                None
            }
        };

        Self::from_backends(networked, MemoryCacheBackend::new())
    }

    /// Create a cache manager that only ever uses in-process storage.
    pub fn in_memory() -> Self {
        Self::from_backends(None, MemoryCacheBackend::new())
    }

    /// Create a cache manager from existing backends (for testing).
    pub fn from_backends(
        networked: Option<Arc<dyn CacheBackend>>,
        local: MemoryCacheBackend,
    ) -> Self {
        Self {
            networked,
            local,
            degraded: AtomicBool::new(false),
        }
    }

    /// The backend that the next operation will use.
    pub fn active_backend(&self) -> BackendKind {
        if self.active_networked().is_some() {
            BackendKind::Networked
        } else {
            BackendKind::Local
        }
    }

    /// Whether a networked failure has forced the in-process fallback.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Probe the active backend.
    pub async fn health_check(&self) -> bool {
        match self.active_networked() {
            Some(backend) => match backend.health_check().await {
                Ok(healthy) => healthy,
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "Cache health check failed");
                    false
                }
            },
            None => true,
        }
    }

    /// Read the raw serialized value for `key`.
    pub async fn read(&self, key: &str) -> CacheRead {
        self.read_with_source(key).await.1
    }

    /// Write a raw serialized value for `key`.
    ///
    /// `ttl` must be at least one millisecond; `put_json` enforces this.
    pub async fn write(&self, key: &str, raw: &str, ttl: Duration) -> CacheWrite {
        match self.active_networked() {
            Some(backend) => match backend.set(key, raw, ttl).await {
                Ok(()) => CacheWrite::Stored,
                Err(e) => {
                    self.downgrade("set", key, &e);
                    CacheWrite::BackendFailed(e)
                }
            },
            None => match self.local.set(key, raw, ttl).await {
                Ok(()) => CacheWrite::Stored,
                Err(e) => CacheWrite::BackendFailed(e),
            },
        }
    }

    /// Get a typed value. `None` covers misses, expiry, and backend failure.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let (source, outcome) = self.read_with_source(key).await;
        match outcome {
            CacheRead::Hit(raw) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(key, backend = source.as_str(), "Cache hit");
                    Some(value)
                }
                Err(e) => {
                    let err = AppError::from(e);
                    match source {
                        BackendKind::Networked => self.downgrade("get", key, &err),
                        BackendKind::Local => {
                            warn!(key, error = %err, "Cached value has an unexpected shape")
                        }
                    }
                    None
                }
            },
            CacheRead::Miss => {
                debug!(key, backend = source.as_str(), "Cache miss");
                None
            }
            CacheRead::BackendFailed(_) => None,
        }
    }

    /// Store a typed value for `ttl`.
    ///
    /// Backend failures are absorbed. Only caller misuse surfaces as an
    /// error: a TTL under one millisecond or a value that cannot be serialized to JSON.
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        // Both backends store whole milliseconds; Redis rejects `PX 0`.
        if ttl.as_millis() == 0 {
            return Err(AppError::validation(format!(
                "Cache TTL for '{key}' must be at least one millisecond"
            )));
        }

        let raw = serde_json::to_string(value)?;
        if let CacheWrite::Stored = self.write(key, &raw, ttl).await {
            debug!(key, ttl_ms = ttl.as_millis() as u64, "Cached value");
        }
        Ok(())
    }

    /// Serve `key` from cache, or run `fetch` and cache its result.
    ///
    /// Errors from `fetch` are returned untouched and nothing is cached.
    /// Failing to cache a fetched value never fails the call.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        self.get_or_fetch_if(key, ttl, fetch, |_| true).await
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch), but a fetched value is only
    /// cached when `cacheable` accepts it.
    pub async fn get_or_fetch_if<T, F, Fut, P>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
        cacheable: P,
    ) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
        P: FnOnce(&T) -> bool,
    {
        if let Some(cached) = self.get_json(key).await {
            return Ok(cached);
        }

        let value = fetch().await?;
        if !cacheable(&value) {
            debug!(key, "Fetched value not cached");
            return Ok(value);
        }
        if let Err(e) = self.put_json(key, &value, ttl).await {
            warn!(key, error = %e, "Fetched value could not be cached");
        }
        Ok(value)
    }

    async fn read_with_source(&self, key: &str) -> (BackendKind, CacheRead) {
        match self.active_networked() {
            Some(backend) => {
                let outcome = match backend.get(key).await {
                    Ok(Some(raw)) => CacheRead::Hit(raw),
                    Ok(None) => CacheRead::Miss,
                    Err(e) => {
                        self.downgrade("get", key, &e);
                        CacheRead::BackendFailed(e)
                    }
                };
                (BackendKind::Networked, outcome)
            }
            None => {
                let outcome = match self.local.get(key).await {
                    Ok(Some(raw)) => CacheRead::Hit(raw),
                    Ok(None) => CacheRead::Miss,
                    Err(e) => CacheRead::BackendFailed(e),
                };
                (BackendKind::Local, outcome)
            }
        }
    }

    fn active_networked(&self) -> Option<&Arc<dyn CacheBackend>> {
        if self.is_degraded() {
            return None;
        }
        self.networked.as_ref()
    }

    /// One-way switch to the in-process backend.
    fn downgrade(&self, op: &'static str, key: &str, err: &AppError) {
        if !self.degraded.swap(true, Ordering::AcqRel) {
            error!(
                op,
                key,
                error = %err,
                "Networked cache failed; using in-process cache until restart"
            );
        } else {
            debug!(op, key, error = %err, "Networked cache failed after downgrade");
        }
    }
}

#[cfg(feature = "redis-backend")]
async fn connect_networked(url: &str, key_prefix: &str) -> Option<Arc<dyn CacheBackend>> {
    match crate::redis::RedisClient::connect(url, key_prefix).await {
        Ok(client) => {
            info!("Initializing Redis cache backend");
            Some(Arc::new(crate::redis::RedisCacheBackend::new(client)))
        }
        Err(e) => {
            error!(error = %e, "Redis unavailable at startup; using in-process cache");
            None
        }
    }
}

#[cfg(not(feature = "redis-backend"))]
async fn connect_networked(_url: &str, _key_prefix: &str) -> Option<Arc<dyn CacheBackend>> {
    warn!("Redis URL configured but the redis-backend feature is disabled; using in-process cache");
    None
}
