//! Stock quote, search, and history handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use marketlens_providers::types::{QuoteBatch, StockQuote, SymbolMatch, TimeSeries};

use crate::dto::request::{QuotesQuery, SearchQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/stocks/{symbol}
pub async fn quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<StockQuote>, ApiError> {
    Ok(Json(state.market.quote(&symbol).await?))
}

/// GET /api/stocks/quotes?symbols=A,B
pub async fn batch_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuotesQuery>,
) -> Result<Json<QuoteBatch>, ApiError> {
    let symbols = query.symbol_list()?;
    Ok(Json(state.market.quotes(&symbols).await))
}

/// GET /api/stocks/search?keywords=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SymbolMatch>>, ApiError> {
    Ok(Json(state.market.search(&query.keywords).await?))
}

/// GET /api/stocks/timeseries/{symbol}
pub async fn time_series(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TimeSeries>, ApiError> {
    Ok(Json(state.market.time_series(&symbol).await?))
}
