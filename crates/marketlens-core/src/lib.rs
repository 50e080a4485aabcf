//! # marketlens-core
//!
//! Core crate for MarketLens. Contains the cache backend trait, the clock
//! abstraction, configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other MarketLens crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
