//! Macroeconomic indicator handler.

use axum::Json;
use axum::extract::{Query, State};

use marketlens_providers::Indicator;
use marketlens_providers::types::MacroSeries;

use crate::dto::request::MacroQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/macro?indicator=CPI
pub async fn macro_series(
    State(state): State<AppState>,
    Query(query): Query<MacroQuery>,
) -> Result<Json<MacroSeries>, ApiError> {
    let indicator: Indicator = query.indicator.trim().parse()?;
    Ok(Json(state.market.macro_series(indicator).await?))
}
