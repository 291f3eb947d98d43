//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::WishlistItemNotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::WalletNotFound
            | Self::GatewayOrderNotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::CouponNotFound
            | Self::CartItemNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::ItemAlreadyCancelled
            | Self::OrderAlreadyCancelled
            | Self::AlreadyRestocked
            | Self::OrderVersionConflict
            | Self::RefundAlreadyIssued
            | Self::PaymentAlreadyCredited
            | Self::CouponAlreadyUsed
            | Self::CouponNameExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::AdminRequired => StatusCode::FORBIDDEN,

            // 402 Payment Required
            Self::PaymentVerificationFailed
            | Self::InsufficientBalance
            | Self::PaymentAmountMismatch
            | Self::PaymentRequired => StatusCode::PAYMENT_REQUIRED,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::InvalidStatusTransition
            | Self::NotEligibleForReturn
            | Self::ReturnNotApproved
            | Self::InvalidOrderOperation
            | Self::InvalidAmount
            | Self::InsufficientStock
            | Self::ProductBlocked
            | Self::OutOfStock
            | Self::CouponExpired
            | Self::CouponNotApplicable
            | Self::CouponMinimumNotMet
            | Self::CartEmpty
            | Self::CartQuantityLimit => StatusCode::BAD_REQUEST,

            // 507 / 503 for storage pressure
            Self::StorageFull => StatusCode::INSUFFICIENT_STORAGE,
            Self::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::OutOfMemory
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
