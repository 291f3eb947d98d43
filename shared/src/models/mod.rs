//! Data models
//!
//! Documents persisted by the server and exchanged over the API.
//! All ids are strings; timestamps are Unix epoch milliseconds.

pub mod address;
pub mod cart;
pub mod category;
pub mod coupon;
pub mod payment;
pub mod product;
pub mod wallet;
pub mod wishlist;

// Re-exports
pub use address::*;
pub use cart::*;
pub use category::*;
pub use coupon::*;
pub use payment::*;
pub use product::*;
pub use wallet::*;
pub use wishlist::*;
