//! Alpha Vantage client: daily OHLCV history.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use marketlens_core::config::ProviderEndpoint;
use marketlens_core::error::AppError;
use marketlens_core::result::AppResult;

use crate::http::{decode, endpoint_url, get_text, require_key, status_error};
use crate::types::{DailyBar, TimeSeries};

const PROVIDER: &str = "Alpha Vantage";
const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Raw `TIME_SERIES_DAILY` payload.
///
/// Errors and throttling notices arrive with a 200 status in their own fields.
#[derive(Debug, Default, Deserialize)]
pub struct DailySeriesResponse {
    #[serde(rename = "Meta Data")]
    pub meta: Option<MetaData>,
    #[serde(rename = "Time Series (Daily)")]
    pub series: Option<BTreeMap<String, DailyValues>>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetaData {
    #[serde(rename = "2. Symbol")]
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct DailyValues {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "5. volume")]
    pub volume: String,
}

impl DailyValues {
    fn to_bar(&self, date: &str) -> Option<DailyBar> {
        Some(DailyBar {
            date: date.to_string(),
            open: self.open.trim().parse().ok()?,
            high: self.high.trim().parse().ok()?,
            low: self.low.trim().parse().ok()?,
            close: self.close.trim().parse().ok()?,
            volume: self.volume.trim().parse().ok()?,
        })
    }
}

/// Classify and reshape a daily-series payload, oldest bar first.
///
/// Rows with unparseable dates or numbers are skipped.
pub fn normalize_daily_series(requested: &str, raw: DailySeriesResponse) -> AppResult<TimeSeries> {
    if let Some(message) = raw.error_message {
        warn!(symbol = requested, message = %message, "Alpha Vantage rejected request");
        return Err(AppError::validation(message));
    }
    if let Some(message) = raw.note.or(raw.information) {
        warn!(symbol = requested, message = %message, "Alpha Vantage throttled request");
        return Err(AppError::rate_limit(message));
    }

    let series = raw.series.filter(|s| !s.is_empty()).ok_or_else(|| {
        AppError::not_found(format!("No time series data found for {requested}."))
    })?;

    let mut dated: Vec<(NaiveDate, DailyBar)> = series
        .iter()
        .filter_map(|(date, values)| {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
            let bar = parsed.and_then(|day| values.to_bar(date).map(|bar| (day, bar)));
            if bar.is_none() {
                debug!(symbol = requested, date = %date, "Skipping malformed daily bar");
            }
            bar
        })
        .collect();
    dated.sort_by_key(|(day, _)| *day);

    let symbol = raw
        .meta
        .map(|m| m.symbol)
        .unwrap_or_else(|| requested.to_string());

    Ok(TimeSeries {
        symbol,
        data: dated.into_iter().map(|(_, bar)| bar).collect(),
    })
}

/// Alpha Vantage REST client.
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AlphaVantageClient {
    pub fn new(http: Client, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http,
            base_url: endpoint.base_url_or(DEFAULT_BASE_URL).to_string(),
            api_key: endpoint.api_key.clone(),
        }
    }

    /// Fetch the compact (last ~100 days) daily series for a symbol.
    pub async fn daily_series(&self, symbol: &str) -> AppResult<TimeSeries> {
        let api_key = require_key(&self.api_key, PROVIDER)?;
        let url = endpoint_url(
            &self.base_url,
            "/query",
            &[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "compact"),
                ("apikey", api_key),
            ],
        )?;
        let response = get_text(&self.http, PROVIDER, url).await?;

        if !response.status.is_success() {
            return Err(status_error(PROVIDER, response.status, None));
        }

        let raw: DailySeriesResponse = decode(PROVIDER, &response.body)?;
        normalize_daily_series(symbol, raw)
    }
}
