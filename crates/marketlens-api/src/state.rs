//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use marketlens_cache::CacheManager;
use marketlens_core::config::AppConfig;
use marketlens_providers::MarketDataService;

/// Shared state, cheap to clone per request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Cached market-data lookups.
    pub market: Arc<MarketDataService>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, market: Arc<MarketDataService>) -> Self {
        Self {
            config,
            market,
            started_at: Instant::now(),
        }
    }

    /// The cache shared by every lookup.
    pub fn cache(&self) -> &CacheManager {
        self.market.cache()
    }
}
