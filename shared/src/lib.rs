//! Shared types for the storefront
//!
//! Domain documents (catalog, coupons, wallets, carts, wishlists, orders),
//! order command/response types and the unified error system used by the
//! server and its API clients.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
