//! Finnhub client: live quotes and symbol search.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use marketlens_core::config::ProviderEndpoint;
use marketlens_core::error::AppError;
use marketlens_core::result::AppResult;

use crate::http::{decode, endpoint_url, get_text, require_key, status_error};
use crate::types::{StockQuote, SymbolMatch};

const PROVIDER: &str = "Finnhub";
const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Raw `/quote` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct FinnhubQuote {
    /// Current price.
    #[serde(default)]
    pub c: f64,
    #[serde(default)]
    pub h: f64,
    #[serde(default)]
    pub l: f64,
    #[serde(default)]
    pub o: f64,
    /// Previous close.
    #[serde(default)]
    pub pc: f64,
    /// Epoch seconds.
    #[serde(default)]
    pub t: i64,
}

impl FinnhubQuote {
    /// Finnhub answers unknown symbols with an all-zero quote.
    pub fn is_empty(&self) -> bool {
        self.c == 0.0 && self.pc == 0.0
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<FinnhubMatch>,
}

#[derive(Debug, Deserialize)]
struct FinnhubMatch {
    #[serde(default)]
    description: String,
    symbol: String,
    #[serde(default, rename = "type")]
    kind: String,
}

/// Reshape a Finnhub quote.
pub fn normalize_quote(symbol: &str, raw: &FinnhubQuote) -> StockQuote {
    let change = raw.c - raw.pc;
    let change_percent = if raw.pc == 0.0 {
        0.0
    } else {
        change / raw.pc * 100.0
    };

    StockQuote {
        symbol: symbol.to_string(),
        asset_type: "stock".to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(raw.t, 0).unwrap_or_default(),
        value: raw.c,
        open: raw.o,
        high: raw.h,
        low: raw.l,
        close: raw.pc,
        volume: 0,
        change,
        change_percent,
        currency: "USD".to_string(),
        source: PROVIDER.to_string(),
    }
}

/// Finnhub REST client.
#[derive(Debug, Clone)]
pub struct FinnhubClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FinnhubClient {
    pub fn new(http: Client, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http,
            base_url: endpoint.base_url_or(DEFAULT_BASE_URL).to_string(),
            api_key: endpoint.api_key.clone(),
        }
    }

    /// Fetch and normalize the quote for an upper-cased symbol.
    pub async fn quote(&self, symbol: &str) -> AppResult<StockQuote> {
        let token = require_key(&self.api_key, PROVIDER)?;
        let url = endpoint_url(&self.base_url, "/quote", &[("symbol", symbol), ("token", token)])?;
        let response = get_text(&self.http, PROVIDER, url).await?;

        if !response.status.is_success() {
            return Err(status_error(PROVIDER, response.status, None));
        }
        if response.body.trim().is_empty() {
            return Err(not_found(symbol));
        }

        let raw: FinnhubQuote = decode(PROVIDER, &response.body)?;
        if raw.is_empty() {
            return Err(not_found(symbol));
        }
        Ok(normalize_quote(symbol, &raw))
    }

    /// Search symbols by free-text keywords. No matches is an empty list.
    pub async fn search(&self, keywords: &str) -> AppResult<Vec<SymbolMatch>> {
        let token = require_key(&self.api_key, PROVIDER)?;
        let url = endpoint_url(&self.base_url, "/search", &[("q", keywords), ("token", token)])?;
        let response = get_text(&self.http, PROVIDER, url).await?;

        if !response.status.is_success() {
            return Err(status_error(PROVIDER, response.status, None));
        }
        if response.body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let raw: SearchResponse = decode(PROVIDER, &response.body)?;
        Ok(raw
            .result
            .into_iter()
            .map(|m| SymbolMatch {
                symbol: m.symbol,
                name: m.description,
                kind: m.kind,
            })
            .collect())
    }
}

fn not_found(symbol: &str) -> AppError {
    AppError::not_found(format!("Stock symbol not found or no data for {symbol}."))
}
