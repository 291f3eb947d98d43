//! Utilities
//!
//! - [`AppError`] / [`ApiResponse`] - HTTP error and response envelope (from shared::error)
//! - logger setup

pub mod error;
pub mod logger;
pub mod result;

pub use error::{ApiResponse, AppError, ErrorCategory, ErrorCode, ok, ok_with_message};
pub use result::{ApiResult, AppResult};
