//! Cache backend configuration.

use serde::{Deserialize, Serialize};

/// Value shipped in `.env` templates; treated as "not configured".
const PLACEHOLDER_REDIS_URL: &str = "your_upstash_redis_url_here";

/// Cache configuration.
///
/// The presence of a Redis connection string is the only switch: with one,
/// the cache starts on Redis; without one, it runs purely in-process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Key prefix for all MarketLens keys stored in Redis.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: default_key_prefix(),
        }
    }
}

impl CacheConfig {
    /// The Redis URL, if one is genuinely configured.
    pub fn networked_url(&self) -> Option<&str> {
        self.redis_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != PLACEHOLDER_REDIS_URL)
    }
}

fn default_key_prefix() -> String {
    "marketlens:".to_string()
}
