//! Convenience result type alias for MarketLens.

use crate::error::AppError;

/// A specialized `Result` type for MarketLens operations.
pub type AppResult<T> = Result<T, AppError>;
