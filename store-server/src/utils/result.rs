//! Result aliases used by HTTP handlers

use axum::Json;

use super::error::ApiResponse;

pub use shared::error::AppResult;

/// Handler return type: a JSON envelope or an [`AppError`](super::AppError)
pub type ApiResult<T> = AppResult<Json<ApiResponse<T>>>;
