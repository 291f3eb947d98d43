//! Cart Model

use serde::{Deserialize, Serialize};

/// Cart line with the price snapshot taken when it was last touched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    /// Discounted unit price at the time of the last change
    pub price: f64,
    pub total_price: f64,
}

/// Per-user cart document
///
/// Created on first add; emptied, never deleted, once an order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub updated_at: i64,
}

impl Cart {
    pub fn new(user_id: impl Into<String>, now: i64) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
            updated_at: now,
        }
    }

    pub fn find_item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn find_item_mut(&mut self, product_id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }

    /// Remove a line, returning whether it existed
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Add-to-cart request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartAdd {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityChange {
    Increase,
    Decrease,
}

/// Quantity step request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartQuantityUpdate {
    pub product_id: String,
    pub change: QuantityChange,
}
