//! # marketlens-providers
//!
//! Clients for the upstream market-data APIs and the normalization layer that
//! reshapes their payloads into MarketLens' uniform schema.
//!
//! - **finnhub**: live quotes and symbol search
//! - **alpha_vantage**: daily OHLCV history
//! - **fred**: macroeconomic indicators
//! - **news**: headlines from NewsAPI
//! - **gemini**: generated market and stock summaries
//!
//! [`MarketDataService`] puts the read-through cache in front of all of them
//! except news and Gemini, which are always fetched live.

pub mod alpha_vantage;
pub mod finnhub;
pub mod fred;
pub mod gemini;
pub mod http;
pub mod insights;
pub mod news;
pub mod service;
pub mod types;

pub use fred::Indicator;
pub use news::NewsQuery;
pub use service::MarketDataService;
