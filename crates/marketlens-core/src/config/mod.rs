//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod cache;
pub mod logging;
pub mod providers;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::app::{CorsConfig, ServerConfig};
pub use self::cache::CacheConfig;
pub use self::logging::LoggingConfig;
pub use self::providers::{ProviderEndpoint, ProvidersConfig};

use crate::error::AppError;

/// Environment variables carried over from the original deployment.
///
/// When set, they win over file and `MARKETLENS__*` values.
const LEGACY_REDIS_URL: &str = "UPSTASH_REDIS_URL";
const LEGACY_FINNHUB_KEY: &str = "FINNHUB_API_KEY";
const LEGACY_ALPHA_VANTAGE_KEY: &str = "ALPHA_VANTAGE_API_KEY";
const LEGACY_FRED_KEY: &str = "FRED_API_KEY";
const LEGACY_NEWS_KEY: &str = "NEWS_API_KEY";
const LEGACY_GEMINI_KEY: &str = "GEMINI_API_KEY";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Cache backend settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Upstream data provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay,
    /// environment variables prefixed with `MARKETLENS__`, and finally the
    /// legacy provider variables.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MARKETLENS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let mut loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.apply_legacy_env(|name| std::env::var(name).ok());
        Ok(loaded)
    }

    /// Overlay values from the legacy environment variables.
    pub fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(LEGACY_REDIS_URL) {
            debug!(var = LEGACY_REDIS_URL, "Using legacy Redis URL variable");
            self.cache.redis_url = Some(url);
        }
        if let Some(key) = non_blank(LEGACY_FINNHUB_KEY) {
            self.providers.finnhub.api_key = Some(key);
        }
        if let Some(key) = non_blank(LEGACY_ALPHA_VANTAGE_KEY) {
            self.providers.alpha_vantage.api_key = Some(key);
        }
        if let Some(key) = non_blank(LEGACY_FRED_KEY) {
            self.providers.fred.api_key = Some(key);
        }
        if let Some(key) = non_blank(LEGACY_NEWS_KEY) {
            self.providers.news_api.api_key = Some(key);
        }
        if let Some(key) = non_blank(LEGACY_GEMINI_KEY) {
            self.providers.gemini.api_key = Some(key);
        }
    }
}
