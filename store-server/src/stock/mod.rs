//! Stock Ledger
//!
//! Product stock is the only catalog field the order engine writes. Units are
//! taken once when an order is placed, given back once when a line is
//! cancelled, and given back once more only by an explicit restock of an
//! approved return.

use shared::models::Product;
use shared::order::{CommandErrorCode, OrderedItem, RequestStatus};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StockError {
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    Insufficient {
        product_id: String,
        requested: u32,
        available: u32,
    },

    #[error("Product {0} is not available for sale")]
    Blocked(String),

    #[error("Return for item {0} has not been approved")]
    NotApproved(String),

    #[error("Item {0} has already been restocked")]
    AlreadyRestocked(String),
}

impl StockError {
    pub fn code(&self) -> CommandErrorCode {
        match self {
            Self::Insufficient { .. } => CommandErrorCode::InsufficientStock,
            Self::Blocked(_) => CommandErrorCode::ProductBlocked,
            Self::NotApproved(_) => CommandErrorCode::ReturnNotApproved,
            Self::AlreadyRestocked(_) => CommandErrorCode::AlreadyRestocked,
        }
    }
}

/// Check that `quantity` units can be sold, without taking them
pub fn check_available(product: &Product, quantity: u32) -> Result<(), StockError> {
    if product.is_blocked {
        return Err(StockError::Blocked(product.id.clone()));
    }
    match product.stock {
        Some(available) if available < quantity => Err(StockError::Insufficient {
            product_id: product.id.clone(),
            requested: quantity,
            available,
        }),
        _ => Ok(()),
    }
}

/// Take `quantity` units; unlimited stock is left untouched
pub fn reserve(product: &mut Product, quantity: u32) -> Result<(), StockError> {
    check_available(product, quantity)?;
    if let Some(stock) = product.stock.as_mut() {
        *stock -= quantity;
    }
    tracing::debug!(product_id = %product.id, quantity, stock = ?product.stock, "Stock reserved");
    Ok(())
}

/// Give back `quantity` units
pub fn release(product: &mut Product, quantity: u32) {
    if let Some(stock) = product.stock.as_mut() {
        *stock = stock.saturating_add(quantity);
    }
    tracing::debug!(product_id = %product.id, quantity, stock = ?product.stock, "Stock released");
}

/// Put a returned line back on the shelf, once
pub fn restock(item: &mut OrderedItem, product: &mut Product) -> Result<(), StockError> {
    if item.request_status != Some(RequestStatus::Approved) {
        return Err(StockError::NotApproved(item.item_id.clone()));
    }
    if item.restocked {
        return Err(StockError::AlreadyRestocked(item.item_id.clone()));
    }
    release(product, item.quantity);
    item.restocked = true;
    Ok(())
}
