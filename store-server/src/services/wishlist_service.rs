//! Wishlist Service

use serde::Serialize;
use shared::models::{Wishlist, WishlistEntry};

use super::{ServiceError, ServiceResult};
use crate::orders::{OrderStorage, StorageError};

/// Wishlist entry joined with its product
#[derive(Debug, Clone, Serialize)]
pub struct WishlistLineView {
    pub product_id: String,
    pub name: String,
    pub images: Vec<String>,
    pub price: f64,
    pub in_stock: bool,
    pub added_on: i64,
}

#[derive(Debug, Clone)]
pub struct WishlistService {
    storage: OrderStorage,
}

impl WishlistService {
    pub fn new(storage: OrderStorage) -> Self {
        Self { storage }
    }

    /// Save a product; adding it twice keeps the first entry
    pub fn add(&self, user_id: &str, product_id: &str, now: i64) -> ServiceResult<Wishlist> {
        let txn = self.storage.begin_write()?;
        if self.storage.get_product_txn(&txn, product_id)?.is_none() {
            return Err(ServiceError::ProductNotFound(product_id.to_string()));
        }

        let mut wishlist = self
            .storage
            .get_wishlist_txn(&txn, user_id)?
            .unwrap_or_else(|| Wishlist::new(user_id));
        if wishlist.contains(product_id) {
            return Ok(wishlist);
        }
        wishlist.products.push(WishlistEntry {
            product_id: product_id.to_string(),
            added_on: now,
        });

        self.storage.store_wishlist(&txn, &wishlist)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(wishlist)
    }

    pub fn remove(&self, user_id: &str, product_id: &str) -> ServiceResult<Wishlist> {
        let txn = self.storage.begin_write()?;
        let mut wishlist = self
            .storage
            .get_wishlist_txn(&txn, user_id)?
            .filter(|w| w.contains(product_id))
            .ok_or_else(|| ServiceError::WishlistItemNotFound(product_id.to_string()))?;
        wishlist.products.retain(|p| p.product_id != product_id);

        self.storage.store_wishlist(&txn, &wishlist)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(wishlist)
    }

    /// Saved products, newest first; deleted products are skipped
    pub fn list(&self, user_id: &str) -> ServiceResult<Vec<WishlistLineView>> {
        let Some(wishlist) = self.storage.get_wishlist(user_id)? else {
            return Ok(Vec::new());
        };

        let mut lines = Vec::with_capacity(wishlist.products.len());
        for entry in wishlist.products.iter().rev() {
            if let Some(product) = self.storage.get_product(&entry.product_id)? {
                lines.push(WishlistLineView {
                    in_stock: product.in_stock() && !product.is_blocked,
                    product_id: product.id,
                    name: product.name,
                    images: product.images,
                    price: product.price,
                    added_on: entry.added_on,
                });
            }
        }
        Ok(lines)
    }
}
