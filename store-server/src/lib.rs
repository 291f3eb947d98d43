//! Store Server - order lifecycle and settlement engine for a storefront
//!
//! # Architecture
//!
//! - **Orders** (`orders`): command-driven order state machine over redb
//! - **Pricing** (`pricing`): product/category offers, shipping, order totals
//! - **Coupons** (`coupons`): general and referral coupon validation
//! - **Stock** (`stock`): reserve and release product stock
//! - **Wallet** (`wallet`): wallet ledger and payment gateway signatures
//! - **HTTP API** (`api`): JSON endpoints for customers and admins
//!
//! # Layout
//!
//! ```text
//! store-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # caller identity extractors
//! ├── services/      # cart, wishlist, coupons, wallet, catalog
//! ├── api/           # HTTP routes and handlers
//! ├── utils/         # error conversions, logger
//! ├── reports/       # sales reports
//! └── orders/        # command manager, actions, storage
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod coupons;
pub mod orders;
pub mod pricing;
pub mod reports;
pub mod services;
pub mod stock;
pub mod utils;
pub mod wallet;

pub use core::{Config, Server, ServerState};
pub use orders::{OrderStorage, OrdersManager};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro, accepts tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_____  ________
  \__ \/ __/ __ \/ ___/ _ \
 ___/ / /_/ /_/ / /  /  __/
/____/\__/\____/_/   \___/
    "#
    );
}
