//! Catalog Service - product and category seeding and reads
//!
//! The order engine only reads the catalog (and writes product stock inside
//! order commands); these admin endpoints exist to seed and adjust it.

use shared::models::{Category, CategoryUpsert, Product, ProductUpsert};
use shared::util::new_id;

use super::{ServiceError, ServiceResult};
use crate::orders::money::{validate_percent, validate_price};
use crate::orders::{OrderError, OrderStorage, StorageError};

#[derive(Debug, Clone)]
pub struct CatalogService {
    storage: OrderStorage,
}

impl CatalogService {
    pub fn new(storage: OrderStorage) -> Self {
        Self { storage }
    }

    // =========================================================================
    // Product - Read
    // =========================================================================

    pub fn get_product(&self, id: &str) -> ServiceResult<Product> {
        self.storage
            .get_product(id)?
            .ok_or_else(|| ServiceError::ProductNotFound(id.to_string()))
    }

    /// Products, newest first; blocked products only when `include_blocked`
    pub fn list_products(&self, include_blocked: bool) -> ServiceResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .storage
            .get_all_products()?
            .into_iter()
            .filter(|p| include_blocked || !p.is_blocked)
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    // =========================================================================
    // Product - Write
    // =========================================================================

    /// Create a product, or replace one when `id` names an existing product
    pub fn upsert_product(&self, data: ProductUpsert, now: i64) -> ServiceResult<Product> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("product name is required".to_string()));
        }
        validate_price(data.price, "price").map_err(invalid)?;
        validate_percent(data.discount, "discount").map_err(invalid)?;

        let txn = self.storage.begin_write()?;
        if let Some(category_id) = data.category_id.as_deref()
            && self.storage.get_category_txn(&txn, category_id)?.is_none()
        {
            return Err(ServiceError::CategoryNotFound(category_id.to_string()));
        }

        let existing = match data.id.as_deref() {
            Some(id) => self.storage.get_product_txn(&txn, id)?,
            None => None,
        };
        let product = Product {
            id: data.id.unwrap_or_else(new_id),
            name,
            images: data.images,
            price: data.price,
            discount: data.discount,
            stock: data.stock,
            is_blocked: data.is_blocked,
            category_id: data.category_id,
            created_at: existing.map_or(now, |p| p.created_at),
        };

        self.storage.store_product(&txn, &product)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(product_id = %product.id, stock = ?product.stock, "Product saved");
        Ok(product)
    }

    pub fn delete_product(&self, id: &str) -> ServiceResult<()> {
        let txn = self.storage.begin_write()?;
        if !self.storage.remove_product(&txn, id)? {
            return Err(ServiceError::ProductNotFound(id.to_string()));
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Category
    // =========================================================================

    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        let mut categories = self.storage.get_all_categories()?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    pub fn upsert_category(&self, data: CategoryUpsert) -> ServiceResult<Category> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("category name is required".to_string()));
        }
        validate_percent(data.category_offer, "category_offer").map_err(invalid)?;

        let category = Category {
            id: data.id.unwrap_or_else(new_id),
            name,
            category_offer: data.category_offer,
            is_listed: data.is_listed,
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_category(&txn, &category)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(category_id = %category.id, offer = category.category_offer, "Category saved");
        Ok(category)
    }
}

fn invalid(err: OrderError) -> ServiceError {
    ServiceError::Validation(err.to_string())
}
