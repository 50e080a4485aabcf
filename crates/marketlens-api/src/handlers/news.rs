//! News feed handler.

use axum::Json;
use axum::extract::{Query, State};

use marketlens_providers::NewsQuery;
use marketlens_providers::types::NewsFeed;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/news?theme=&category=&q=&page=&pageSize=&sortBy=
pub async fn news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<NewsFeed>, ApiError> {
    Ok(Json(state.market.news(&query).await?))
}
