//! Customer and admin services outside the order command path
//!
//! - [`CartService`] - cart lines with stock and quantity limits, checkout payments
//! - [`WishlistService`] - saved products
//! - [`CouponService`] - coupon admin, referral issue, apply-coupon quotes
//! - [`WalletService`] - wallet view, top-up gateway orders and their settlement
//! - [`CatalogService`] - product/category seeding and reads
//!
//! Each write runs in its own redb transaction on the shared [`OrderStorage`].
//!
//! [`OrderStorage`]: crate::orders::OrderStorage

pub mod cart_service;
pub mod catalog_service;
pub mod coupon_service;
pub mod wallet_service;
pub mod wishlist_service;

pub use cart_service::{CartLineView, CartService, CartView};
pub use catalog_service::CatalogService;
pub use coupon_service::CouponService;
pub use wallet_service::WalletService;
pub use wishlist_service::{WishlistLineView, WishlistService};

use shared::error::ErrorCode;
use thiserror::Error;

use crate::coupons::CouponRejection;
use crate::orders::StorageError;
use crate::orders::manager::classify_storage_error;
use crate::wallet::WalletError;

/// Service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Category {0} not found")]
    CategoryNotFound(String),

    #[error("Product {0} is not available")]
    ProductBlocked(String),

    #[error("Product {0} is out of stock")]
    OutOfStock(String),

    #[error("Only {available} left in stock for {product_id}")]
    InsufficientStock { product_id: String, available: u32 },

    #[error("Maximum {max} units per product")]
    QuantityLimit { max: u32 },

    #[error("Cart is empty")]
    CartEmpty,

    #[error("Product {0} is not in the cart")]
    CartItemNotFound(String),

    #[error("Product {0} is not in the wishlist")]
    WishlistItemNotFound(String),

    #[error("Coupon {0} not found")]
    CouponNotFound(String),

    #[error("Coupon code {0} already exists")]
    CouponNameExists(String),

    #[error(transparent)]
    Coupon(#[from] CouponRejection),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Storage(e) => classify_storage_error(e).into(),
            Self::ProductNotFound(_) => ErrorCode::ProductNotFound,
            Self::CategoryNotFound(_) => ErrorCode::CategoryNotFound,
            Self::ProductBlocked(_) => ErrorCode::ProductBlocked,
            Self::OutOfStock(_) => ErrorCode::OutOfStock,
            Self::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            Self::QuantityLimit { .. } => ErrorCode::CartQuantityLimit,
            Self::CartEmpty => ErrorCode::CartEmpty,
            Self::CartItemNotFound(_) => ErrorCode::CartItemNotFound,
            Self::WishlistItemNotFound(_) => ErrorCode::WishlistItemNotFound,
            Self::CouponNotFound(_) => ErrorCode::CouponNotFound,
            Self::CouponNameExists(_) => ErrorCode::CouponNameExists,
            Self::Coupon(e) => e.code().into(),
            Self::Wallet(e) => e.code().into(),
            Self::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
