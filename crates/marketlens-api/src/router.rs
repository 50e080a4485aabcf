//! Route definitions for the MarketLens HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::{Router, routing::get};

use crate::handlers;
use crate::state::AppState;

/// Build the router and attach the shared state.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(stock_routes())
        .merge(macro_routes())
        .merge(news_routes())
        .merge(insight_routes());

    Router::new()
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Static segments win over `{symbol}`, so `quotes` and `search` are never
/// taken for tickers.
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/stocks/quotes", get(handlers::stocks::batch_quotes))
        .route("/stocks/search", get(handlers::stocks::search))
        .route(
            "/stocks/timeseries/{symbol}",
            get(handlers::stocks::time_series),
        )
        .route("/stocks/{symbol}", get(handlers::stocks::quote))
}

fn macro_routes() -> Router<AppState> {
    Router::new().route("/macro", get(handlers::macro_data::macro_series))
}

fn news_routes() -> Router<AppState> {
    Router::new().route("/news", get(handlers::news::news))
}

fn insight_routes() -> Router<AppState> {
    Router::new()
        .route("/insights", get(handlers::insights::market_insight))
        .route("/insights/{symbol}", get(handlers::insights::stock_insight))
}
