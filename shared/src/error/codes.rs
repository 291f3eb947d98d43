//! Unified error codes for the storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Wishlist errors
//! - 4xxx: Order errors
//! - 5xxx: Payment and wallet errors
//! - 6xxx: Product and stock errors
//! - 7xxx: Coupon errors
//! - 8xxx: Cart errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can switch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller identity missing
    NotAuthenticated = 1001,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Wishlist ====================
    /// Product is not in the wishlist
    WishlistItemNotFound = 3001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Ordered item not found
    OrderItemNotFound = 4002,
    /// Item already cancelled
    ItemAlreadyCancelled = 4003,
    /// Order already cancelled
    OrderAlreadyCancelled = 4004,
    /// Status change not allowed from the current status
    InvalidStatusTransition = 4005,
    /// Item is outside the return window or not delivered
    NotEligibleForReturn = 4006,
    /// Return has not been approved
    ReturnNotApproved = 4007,
    /// Item already restocked
    AlreadyRestocked = 4008,
    /// Order was modified concurrently
    OrderVersionConflict = 4009,
    /// Operation not valid for this order
    InvalidOrderOperation = 4010,

    // ==================== 5xxx: Payment / Wallet ====================
    /// Payment gateway signature did not verify
    PaymentVerificationFailed = 5001,
    /// Wallet balance too low
    InsufficientBalance = 5002,
    /// Wallet not found
    WalletNotFound = 5003,
    /// Refund already credited for this item
    RefundAlreadyIssued = 5004,
    /// Amount is not a valid positive money value
    InvalidAmount = 5005,
    /// Gateway payment already settled a top-up or an order
    PaymentAlreadyCredited = 5006,
    /// Payment details missing for an online payment
    PaymentRequired = 5007,
    /// Paid amount differs from the amount being settled
    PaymentAmountMismatch = 5008,
    /// Gateway order unknown, or opened by another customer or for another purpose
    GatewayOrderNotFound = 5009,

    // ==================== 6xxx: Product / Stock ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6002,
    /// Not enough stock
    InsufficientStock = 6003,
    /// Product is blocked
    ProductBlocked = 6004,
    /// Product is out of stock
    OutOfStock = 6005,

    // ==================== 7xxx: Coupon ====================
    /// Coupon not found or not listed
    CouponNotFound = 7001,
    /// Coupon expired
    CouponExpired = 7002,
    /// Coupon already used
    CouponAlreadyUsed = 7003,
    /// Coupon belongs to another user
    CouponNotApplicable = 7004,
    /// Order total below coupon minimum
    CouponMinimumNotMet = 7005,
    /// Coupon code already taken
    CouponNameExists = 7006,

    // ==================== 8xxx: Cart ====================
    /// Cart is empty
    CartEmpty = 8001,
    /// Product is not in the cart
    CartItemNotFound = 8002,
    /// Per-product quantity limit reached
    CartQuantityLimit = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Storage full (disk space insufficient)
    StorageFull = 9401,
    /// Out of memory
    OutOfMemory = 9402,
    /// Storage corrupted (data file damaged)
    StorageCorrupted = 9403,
    /// System busy (IO error, retry later)
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth / permission
            ErrorCode::NotAuthenticated => "Caller identity is missing",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Admin role required",

            // Wishlist
            ErrorCode::WishlistItemNotFound => "Product is not in the wishlist",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::ItemAlreadyCancelled => "Item already cancelled",
            ErrorCode::OrderAlreadyCancelled => "Order already cancelled",
            ErrorCode::InvalidStatusTransition => "Status change not allowed",
            ErrorCode::NotEligibleForReturn => "Order is not eligible for return",
            ErrorCode::ReturnNotApproved => "Return request is not approved",
            ErrorCode::AlreadyRestocked => "Item already restocked",
            ErrorCode::OrderVersionConflict => "Order was modified by another request",
            ErrorCode::InvalidOrderOperation => "Invalid order operation",

            // Payment / wallet
            ErrorCode::PaymentVerificationFailed => "Payment verification failed",
            ErrorCode::InsufficientBalance => "Insufficient wallet balance",
            ErrorCode::WalletNotFound => "Wallet not found",
            ErrorCode::RefundAlreadyIssued => "Refund already issued",
            ErrorCode::InvalidAmount => "Invalid amount",
            ErrorCode::PaymentAlreadyCredited => "Payment already credited",
            ErrorCode::PaymentRequired => "Payment details required",
            ErrorCode::PaymentAmountMismatch => "Payment amount does not match",
            ErrorCode::GatewayOrderNotFound => "Payment order not found",

            // Product / stock
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ProductBlocked => "Product is not available",
            ErrorCode::OutOfStock => "Product is out of stock",

            // Coupon
            ErrorCode::CouponNotFound => "Invalid coupon code",
            ErrorCode::CouponExpired => "Coupon has expired",
            ErrorCode::CouponAlreadyUsed => "Coupon already used",
            ErrorCode::CouponNotApplicable => "Coupon is not applicable",
            ErrorCode::CouponMinimumNotMet => "Order total is below the coupon minimum",
            ErrorCode::CouponNameExists => "Coupon code already exists",

            // Cart
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartItemNotFound => "Product is not in the cart",
            ErrorCode::CartQuantityLimit => "Maximum quantity per product reached",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageFull => "Storage is full",
            ErrorCode::OutOfMemory => "Out of memory",
            ErrorCode::StorageCorrupted => "Storage is corrupted",
            ErrorCode::SystemBusy => "System busy, retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            1001 => Ok(ErrorCode::NotAuthenticated),
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            3001 => Ok(ErrorCode::WishlistItemNotFound),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderItemNotFound),
            4003 => Ok(ErrorCode::ItemAlreadyCancelled),
            4004 => Ok(ErrorCode::OrderAlreadyCancelled),
            4005 => Ok(ErrorCode::InvalidStatusTransition),
            4006 => Ok(ErrorCode::NotEligibleForReturn),
            4007 => Ok(ErrorCode::ReturnNotApproved),
            4008 => Ok(ErrorCode::AlreadyRestocked),
            4009 => Ok(ErrorCode::OrderVersionConflict),
            4010 => Ok(ErrorCode::InvalidOrderOperation),

            5001 => Ok(ErrorCode::PaymentVerificationFailed),
            5002 => Ok(ErrorCode::InsufficientBalance),
            5003 => Ok(ErrorCode::WalletNotFound),
            5004 => Ok(ErrorCode::RefundAlreadyIssued),
            5005 => Ok(ErrorCode::InvalidAmount),
            5006 => Ok(ErrorCode::PaymentAlreadyCredited),
            5007 => Ok(ErrorCode::PaymentRequired),
            5008 => Ok(ErrorCode::PaymentAmountMismatch),
            5009 => Ok(ErrorCode::GatewayOrderNotFound),

            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::CategoryNotFound),
            6003 => Ok(ErrorCode::InsufficientStock),
            6004 => Ok(ErrorCode::ProductBlocked),
            6005 => Ok(ErrorCode::OutOfStock),

            7001 => Ok(ErrorCode::CouponNotFound),
            7002 => Ok(ErrorCode::CouponExpired),
            7003 => Ok(ErrorCode::CouponAlreadyUsed),
            7004 => Ok(ErrorCode::CouponNotApplicable),
            7005 => Ok(ErrorCode::CouponMinimumNotMet),
            7006 => Ok(ErrorCode::CouponNameExists),

            8001 => Ok(ErrorCode::CartEmpty),
            8002 => Ok(ErrorCode::CartItemNotFound),
            8003 => Ok(ErrorCode::CartQuantityLimit),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9401 => Ok(ErrorCode::StorageFull),
            9402 => Ok(ErrorCode::OutOfMemory),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::NotEligibleForReturn.code(), 4006);
        assert_eq!(ErrorCode::PaymentVerificationFailed.code(), 5001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6003);
        assert_eq!(ErrorCode::CouponAlreadyUsed.code(), 7003);
        assert_eq!(ErrorCode::CartQuantityLimit.code(), 8003);
        assert_eq!(ErrorCode::SystemBusy.code(), 9404);
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::AdminRequired,
            ErrorCode::WishlistItemNotFound,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderItemNotFound,
            ErrorCode::ItemAlreadyCancelled,
            ErrorCode::OrderAlreadyCancelled,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::NotEligibleForReturn,
            ErrorCode::ReturnNotApproved,
            ErrorCode::AlreadyRestocked,
            ErrorCode::OrderVersionConflict,
            ErrorCode::InvalidOrderOperation,
            ErrorCode::PaymentVerificationFailed,
            ErrorCode::InsufficientBalance,
            ErrorCode::WalletNotFound,
            ErrorCode::RefundAlreadyIssued,
            ErrorCode::InvalidAmount,
            ErrorCode::PaymentAlreadyCredited,
            ErrorCode::PaymentRequired,
            ErrorCode::PaymentAmountMismatch,
            ErrorCode::GatewayOrderNotFound,
            ErrorCode::ProductNotFound,
            ErrorCode::CategoryNotFound,
            ErrorCode::InsufficientStock,
            ErrorCode::ProductBlocked,
            ErrorCode::OutOfStock,
            ErrorCode::CouponNotFound,
            ErrorCode::CouponExpired,
            ErrorCode::CouponAlreadyUsed,
            ErrorCode::CouponNotApplicable,
            ErrorCode::CouponMinimumNotMet,
            ErrorCode::CouponNameExists,
            ErrorCode::CartEmpty,
            ErrorCode::CartItemNotFound,
            ErrorCode::CartQuantityLimit,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
            ErrorCode::StorageFull,
            ErrorCode::OutOfMemory,
            ErrorCode::StorageCorrupted,
            ErrorCode::SystemBusy,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(6), Err(InvalidErrorCode(6)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::CouponExpired).unwrap();
        assert_eq!(json, "7002");
        let code: ErrorCode = serde_json::from_str("4006").unwrap();
        assert_eq!(code, ErrorCode::NotEligibleForReturn);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(
            ErrorCode::NotEligibleForReturn.message(),
            "Order is not eligible for return"
        );
        assert_eq!(ErrorCode::InsufficientBalance.message(), "Insufficient wallet balance");
    }
}
