//! Upstream market-data provider configuration.

use serde::{Deserialize, Serialize};

/// Settings for all upstream data providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// HTTP timeout applied to every provider request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Finnhub (quotes and symbol search).
    #[serde(default)]
    pub finnhub: ProviderEndpoint,
    /// Alpha Vantage (daily time series).
    #[serde(default)]
    pub alpha_vantage: ProviderEndpoint,
    /// FRED (macroeconomic series).
    #[serde(default)]
    pub fred: ProviderEndpoint,
    /// NewsAPI (headlines).
    #[serde(default)]
    pub news_api: ProviderEndpoint,
    /// Gemini (generated market summaries).
    #[serde(default)]
    pub gemini: ProviderEndpoint,
    /// Generative model used for summaries.
    #[serde(default = "default_insight_model")]
    pub insight_model: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            finnhub: ProviderEndpoint::default(),
            alpha_vantage: ProviderEndpoint::default(),
            fred: ProviderEndpoint::default(),
            news_api: ProviderEndpoint::default(),
            gemini: ProviderEndpoint::default(),
            insight_model: default_insight_model(),
        }
    }
}

/// Base URL override and credentials for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    /// API key; requests fail with a configuration error when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override. The provider's public endpoint is used when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderEndpoint {
    /// Endpoint with an explicit base URL and key.
    pub fn new(base_url: impl Into<String>, api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.map(str::to_string),
            base_url: Some(base_url.into()),
        }
    }

    /// The configured base URL without a trailing slash, or `fallback`.
    pub fn base_url_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .unwrap_or(fallback)
            .trim_end_matches('/')
    }
}

fn default_request_timeout() -> u64 {
    15
}

fn default_insight_model() -> String {
    "gemma-3-27b-it".to_string()
}
