//! HTTP API
//!
//! Every endpoint answers with the [`ApiResponse`](crate::utils::ApiResponse)
//! envelope; payload fields are flattened into the top-level object.
//!
//! - [`health`] - liveness and store counters
//! - [`orders`] - order commands and reads (customer and admin)
//! - [`cart`] / [`wishlist`] - customer lists
//! - [`coupons`] - apply, availability and coupon admin
//! - [`wallet`] - wallet view and top-up
//! - [`catalog`] - product/category reads and seeding
//! - [`reports`] - sales report

pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod health;
pub mod orders;
pub mod reports;
pub mod wallet;
pub mod wishlist;

#[cfg(test)]
mod tests;

// Re-export common types for handlers
pub use crate::utils::{ApiResult, AppError, ok, ok_with_message};
