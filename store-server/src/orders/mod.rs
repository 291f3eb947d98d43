//! Order lifecycle
//!
//! - **manager**: `OrdersManager`, runs every command in one write transaction
//! - **actions**: one handler per order command
//! - **reducer**: item transitions and derived order status/totals
//! - **storage**: redb tables for orders and the documents commands touch
//!
//! # Data Flow
//!
//! ```text
//! OrderCommand → OrdersManager → CommandAction → CommandContext (staged docs)
//!                      ↓                                  ↓
//!               CommandResponse  ←──── commit ←──── Storage (redb)
//! ```

pub mod actions;
pub mod manager;
pub mod money;
pub mod reducer;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports
pub use manager::{ManagerError, OrdersManager};
pub use storage::{OrderStorage, StorageError};
pub use traits::{OrderError, OrderPolicy};

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, Order, OrderCommand, OrderCommandPayload,
    OrderStatus,
};
