//! Route handlers organized by domain.

pub mod health;
pub mod insights;
pub mod macro_data;
pub mod news;
pub mod stocks;

use marketlens_core::error::AppError;

use crate::error::ApiError;

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::from(AppError::not_found("Route not found."))
}
