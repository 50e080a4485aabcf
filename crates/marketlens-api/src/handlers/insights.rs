//! Generated market and stock summaries.

use axum::Json;
use axum::extract::{Path, State};

use marketlens_providers::types::Insight;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/insights
pub async fn market_insight(State(state): State<AppState>) -> Result<Json<Insight>, ApiError> {
    Ok(Json(state.market.market_insight().await?))
}

/// GET /api/insights/{symbol}
pub async fn stock_insight(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Insight>, ApiError> {
    Ok(Json(state.market.stock_insight(&symbol).await?))
}
