//! Normalized market-data models.
//!
//! These are the shapes served to clients and stored in the cache,
//! independent of which provider produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub asset_type: String,
    /// Time of the last trade.
    pub timestamp: DateTime<Utc>,
    /// Current price.
    pub value: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Previous close.
    pub close: f64,
    /// Not reported by the quote endpoint; always zero.
    pub volume: u64,
    pub change: f64,
    pub change_percent: f64,
    pub currency: String,
    pub source: String,
}

/// One symbol search match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily history for a symbol, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub symbol: String,
    pub data: Vec<DailyBar>,
}

/// Latest reading of a macro indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroReading {
    pub date: String,
    pub value: f64,
    pub unit: String,
}

/// A historical macro observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroPoint {
    pub date: String,
    pub value: f64,
}

/// A macro indicator with its latest reading and recent history (newest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSeries {
    pub indicator: String,
    pub name: String,
    pub live: MacroReading,
    pub historical: Vec<MacroPoint>,
}

/// Result of quoting several symbols at once.
///
/// Each symbol settles independently; failures do not hide successes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteBatch {
    pub quotes: Vec<StockQuote>,
    pub errors: Vec<QuoteFailure>,
}

/// Why one symbol in a batch could not be quoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteFailure {
    pub symbol: String,
    pub error: String,
}

/// A page of news headlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsFeed {
    pub status: String,
    pub total_results: u64,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: String,
}

/// Market-wide data gathered for a generated summary.
///
/// Each source settles on its own; whatever failed is simply missing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketSnapshot {
    pub headlines: Vec<Article>,
    pub stocks: Vec<StockQuote>,
    pub indices: Vec<StockQuote>,
    pub macros: Vec<MacroSeries>,
}

/// Data gathered for one symbol's generated summary.
#[derive(Debug, Clone, Serialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub quote: Option<StockQuote>,
    pub history: Option<TimeSeries>,
    pub headlines: Vec<Article>,
}

/// Generated narrative text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub insight: String,
}
