//! Cache key builders and TTLs for all MarketLens cache entries.
//!
//! Keys follow `{domain}_{identifier}`. TTLs track how quickly each kind of
//! data goes stale upstream.

use std::time::Duration;

/// Live quotes.
pub const QUOTE_TTL: Duration = Duration::from_secs(5 * 60);

/// Symbol search results.
pub const SEARCH_TTL: Duration = Duration::from_secs(60 * 60);

/// Daily historical bars.
pub const TIME_SERIES_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Macroeconomic series.
pub const MACRO_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key for a live quote. Symbols are case-insensitive.
pub fn stock_quote(symbol: &str) -> String {
    format!("stock_quote_{}", symbol.to_uppercase())
}

/// Cache key for a symbol search. Keywords are case-insensitive.
pub fn stock_search(keywords: &str) -> String {
    format!("stock_search_{}", keywords.to_lowercase())
}

/// Cache key for a daily time series.
pub fn time_series(symbol: &str) -> String {
    format!("timeseries_{}", symbol.to_uppercase())
}

/// Cache key for a macro indicator, e.g. `CPI`.
pub fn macro_series(indicator: &str) -> String {
    format!("macro_{indicator}")
}
