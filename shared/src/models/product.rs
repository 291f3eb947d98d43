//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity
///
/// The order engine reads price, discount and category; the only field it
/// ever writes is `stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Regular (pre-discount) unit price
    pub price: f64,
    /// Product discount in percent (0-100)
    #[serde(default)]
    pub discount: f64,
    /// Units on hand; `None` means unlimited
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub is_blocked: bool,
    /// Category reference
    #[serde(default)]
    pub category_id: Option<String>,
    pub created_at: i64,
}

impl Product {
    /// Whether at least one unit can be sold
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|s| s > 0)
    }
}

/// Create or replace product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpsert {
    /// Keep an existing id to replace the product, omit to create
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub category_id: Option<String>,
}
