//! HTTP error mapping
//!
//! Handlers return [`AppResult`]; every domain error converts into
//! [`AppError`] so `?` works directly in a handler body.
//!
//! ```ignore
//! let cart = state.cart.add(&user_id, &req, now_millis())?;
//! Ok(ok_with_message(cart, "Added to cart"))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::orders::manager::classify_storage_error;
use crate::orders::{CommandError, ManagerError, StorageError};
use crate::reports::ReportError;
use crate::services::ServiceError;

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::with_message(err.code(), err.to_string())
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        CommandError::from(err).into()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::with_message(classify_storage_error(&err).into(), err.to_string())
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Success envelope with the default message
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Success envelope with a custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}
