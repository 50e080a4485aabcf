//! FRED client: macroeconomic indicators.

use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::Deserialize;

use marketlens_core::config::ProviderEndpoint;
use marketlens_core::error::AppError;
use marketlens_core::result::AppResult;

use crate::http::{decode, endpoint_url, get_text, require_key};
use crate::types::{MacroPoint, MacroReading, MacroSeries};

const PROVIDER: &str = "FRED";
const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";

/// Enough history to compute changes; ~8 years of a monthly series.
const OBSERVATION_LIMIT: &str = "100";

/// Supported macro indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Cpi,
    Gdp,
    FederalFundsRate,
    Unemployment,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Cpi,
        Indicator::Gdp,
        Indicator::FederalFundsRate,
        Indicator::Unemployment,
    ];

    /// Public identifier, also used in cache keys.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cpi => "CPI",
            Self::Gdp => "GDP",
            Self::FederalFundsRate => "FEDERAL_FUNDS_RATE",
            Self::Unemployment => "UNEMPLOYMENT",
        }
    }

    /// FRED series backing the indicator.
    pub fn series_id(&self) -> &'static str {
        match self {
            Self::Cpi => "CPIAUCSL",
            Self::Gdp => "GDPC1",
            Self::FederalFundsRate => "FEDFUNDS",
            Self::Unemployment => "UNRATE",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cpi => "CPI",
            Self::Gdp => "Real GDP",
            Self::FederalFundsRate => "Interest Rate",
            Self::Unemployment => "Unemployment",
        }
    }

    /// CPI is an index and has no unit; GDP is in billions of dollars.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Cpi => "",
            Self::Gdp => "B",
            Self::FederalFundsRate | Self::Unemployment => "%",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Indicator {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|indicator| indicator.code() == s)
            .ok_or_else(|| AppError::validation("Invalid or missing 'indicator' query parameter."))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ObservationsResponse {
    #[serde(default)]
    pub observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
pub struct Observation {
    pub date: String,
    /// Decimal string; `"."` marks a missing value.
    pub value: String,
}

/// Reshape FRED observations (newest first) into a macro series.
///
/// Missing values are dropped; the live reading is the newest valid one.
pub fn normalize_observations(
    indicator: Indicator,
    raw: ObservationsResponse,
) -> AppResult<MacroSeries> {
    let historical: Vec<MacroPoint> = raw
        .observations
        .into_iter()
        .filter_map(|obs| {
            let value: f64 = obs.value.trim().parse().ok()?;
            value.is_finite().then_some(MacroPoint {
                date: obs.date,
                value,
            })
        })
        .collect();

    let latest = historical
        .first()
        .ok_or_else(|| AppError::not_found("No data found for this indicator."))?;

    Ok(MacroSeries {
        indicator: indicator.code().to_string(),
        name: indicator.display_name().to_string(),
        live: MacroReading {
            date: latest.date.clone(),
            value: latest.value,
            unit: indicator.unit().to_string(),
        },
        historical,
    })
}

#[derive(Debug, Deserialize)]
struct FredErrorBody {
    error_message: Option<String>,
}

/// FRED REST client.
#[derive(Debug, Clone)]
pub struct FredClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FredClient {
    pub fn new(http: Client, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http,
            base_url: endpoint.base_url_or(DEFAULT_BASE_URL).to_string(),
            api_key: endpoint.api_key.clone(),
        }
    }

    /// Fetch the most recent observations for an indicator.
    pub async fn series(&self, indicator: Indicator) -> AppResult<MacroSeries> {
        let api_key = require_key(&self.api_key, PROVIDER)?;
        let series_id = indicator.series_id();
        let url = endpoint_url(
            &self.base_url,
            "/fred/series/observations",
            &[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", OBSERVATION_LIMIT),
            ],
        )?;
        let response = get_text(&self.http, PROVIDER, url).await?;

        if !response.status.is_success() {
            let detail = serde_json::from_str::<FredErrorBody>(&response.body)
                .ok()
                .and_then(|body| body.error_message)
                .unwrap_or(response.body);
            return Err(AppError::external_service(format!(
                "FRED API error for {series_id}: {} - {detail}",
                response.status.as_u16()
            )));
        }

        let raw: ObservationsResponse = decode(PROVIDER, &response.body)?;
        normalize_observations(indicator, raw)
    }
}
