//! # marketlens-api
//!
//! HTTP API layer for MarketLens built on Axum.
//!
//! Provides the REST endpoints over the cached market-data service,
//! middleware (CORS, compression, tracing, request logging), DTOs, and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
