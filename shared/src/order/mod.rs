//! Order types
//!
//! - Commands: requests to change an order, executed atomically by the server
//! - Document: the persisted order with its embedded lines
//! - Types: status machine, payment and command result types

pub mod command;
pub mod document;
pub mod types;

// Re-exports
pub use command::{Actor, OrderCommand, OrderCommandPayload};
pub use document::{Order, OrderedItem};
pub use types::*;
