//! Wishlist Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub product_id: String,
    pub added_on: i64,
}

/// Per-user set of saved products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wishlist {
    pub user_id: String,
    #[serde(default)]
    pub products: Vec<WishlistEntry>,
}

impl Wishlist {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            products: Vec::new(),
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.products.iter().any(|p| p.product_id == product_id)
    }
}
