//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `orders` | `order_id` | `Order` |
//! | `products` | `product_id` | `Product` |
//! | `categories` | `category_id` | `Category` |
//! | `coupons` | coupon name | `Coupon` |
//! | `wallets` | `user_id` | `Wallet` |
//! | `carts` | `user_id` | `Cart` |
//! | `wishlists` | `user_id` | `Wishlist` |
//! | `gateway_orders` | `gateway_order_id` | `GatewayOrder` |
//! | `payments` | `payment_id` | `SettledPayment` |
//! | `processed_commands` | `command_id` | `()` |
//!
//! Values are JSON documents. Every order command reads and writes through one
//! `WriteTransaction`; redb serializes writers, so a command either commits all
//! of its document changes or none.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{Cart, Category, Coupon, GatewayOrder, Product, SettledPayment, Wallet, Wishlist};
use shared::order::Order;
use thiserror::Error;

type DocTable = TableDefinition<'static, &'static str, &'static [u8]>;

const ORDERS_TABLE: DocTable = TableDefinition::new("orders");
const PRODUCTS_TABLE: DocTable = TableDefinition::new("products");
const CATEGORIES_TABLE: DocTable = TableDefinition::new("categories");
const COUPONS_TABLE: DocTable = TableDefinition::new("coupons");
const WALLETS_TABLE: DocTable = TableDefinition::new("wallets");
const CARTS_TABLE: DocTable = TableDefinition::new("carts");
const WISHLISTS_TABLE: DocTable = TableDefinition::new("wishlists");
const GATEWAY_ORDERS_TABLE: DocTable = TableDefinition::new("gateway_orders");
const PAYMENTS_TABLE: DocTable = TableDefinition::new("payments");

/// Table for tracking processed commands: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

const DOC_TABLES: [DocTable; 9] = [
    ORDERS_TABLE,
    PRODUCTS_TABLE,
    CATEGORIES_TABLE,
    COUPONS_TABLE,
    WALLETS_TABLE,
    CARTS_TABLE,
    WISHLISTS_TABLE,
    GATEWAY_ORDERS_TABLE,
    PAYMENTS_TABLE,
];

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Document storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate`: once `commit()` returns the
    /// change is on disk, and the copy-on-write file is never left half written.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            for table in DOC_TABLES {
                let _ = write_txn.open_table(table)?;
            }
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Generic document access ==========

    fn get_doc<T: DeserializeOwned>(&self, def: DocTable, key: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;

        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_doc_txn<T: DeserializeOwned>(
        txn: &WriteTransaction,
        def: DocTable,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let table = txn.open_table(def)?;

        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn list_docs<T: DeserializeOwned>(&self, def: DocTable) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;

        let mut docs = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            docs.push(serde_json::from_slice(value.value())?);
        }

        Ok(docs)
    }

    fn put_doc<T: Serialize>(
        txn: &WriteTransaction,
        def: DocTable,
        key: &str,
        doc: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(def)?;
        let value = serde_json::to_vec(doc)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    fn remove_doc(txn: &WriteTransaction, def: DocTable, key: &str) -> StorageResult<bool> {
        let mut table = txn.open_table(def)?;
        Ok(table.remove(key)?.is_some())
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Orders ==========

    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        Self::put_doc(txn, ORDERS_TABLE, &order.order_id, order)
    }

    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        self.get_doc(ORDERS_TABLE, order_id)
    }

    pub fn get_order_txn(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<Option<Order>> {
        Self::get_doc_txn(txn, ORDERS_TABLE, order_id)
    }

    /// All orders, newest first
    pub fn get_all_orders(&self) -> StorageResult<Vec<Order>> {
        let mut orders: Vec<Order> = self.list_docs(ORDERS_TABLE)?;
        orders.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(orders)
    }

    /// Orders placed by one user, newest first
    pub fn get_orders_for_user(&self, user_id: &str) -> StorageResult<Vec<Order>> {
        let mut orders = self.get_all_orders()?;
        orders.retain(|o| o.user_id == user_id);
        Ok(orders)
    }

    // ========== Catalog ==========

    pub fn store_product(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        Self::put_doc(txn, PRODUCTS_TABLE, &product.id, product)
    }

    pub fn get_product(&self, product_id: &str) -> StorageResult<Option<Product>> {
        self.get_doc(PRODUCTS_TABLE, product_id)
    }

    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
    ) -> StorageResult<Option<Product>> {
        Self::get_doc_txn(txn, PRODUCTS_TABLE, product_id)
    }

    pub fn get_all_products(&self) -> StorageResult<Vec<Product>> {
        self.list_docs(PRODUCTS_TABLE)
    }

    pub fn remove_product(&self, txn: &WriteTransaction, product_id: &str) -> StorageResult<bool> {
        Self::remove_doc(txn, PRODUCTS_TABLE, product_id)
    }

    pub fn store_category(&self, txn: &WriteTransaction, category: &Category) -> StorageResult<()> {
        Self::put_doc(txn, CATEGORIES_TABLE, &category.id, category)
    }

    pub fn get_category(&self, category_id: &str) -> StorageResult<Option<Category>> {
        self.get_doc(CATEGORIES_TABLE, category_id)
    }

    pub fn get_category_txn(
        &self,
        txn: &WriteTransaction,
        category_id: &str,
    ) -> StorageResult<Option<Category>> {
        Self::get_doc_txn(txn, CATEGORIES_TABLE, category_id)
    }

    pub fn get_all_categories(&self) -> StorageResult<Vec<Category>> {
        self.list_docs(CATEGORIES_TABLE)
    }

    // ========== Coupons ==========

    pub fn store_coupon(&self, txn: &WriteTransaction, coupon: &Coupon) -> StorageResult<()> {
        Self::put_doc(txn, COUPONS_TABLE, &coupon.name, coupon)
    }

    pub fn get_coupon(&self, name: &str) -> StorageResult<Option<Coupon>> {
        self.get_doc(COUPONS_TABLE, name)
    }

    pub fn get_coupon_txn(&self, txn: &WriteTransaction, name: &str) -> StorageResult<Option<Coupon>> {
        Self::get_doc_txn(txn, COUPONS_TABLE, name)
    }

    pub fn get_all_coupons(&self) -> StorageResult<Vec<Coupon>> {
        self.list_docs(COUPONS_TABLE)
    }

    pub fn remove_coupon(&self, txn: &WriteTransaction, name: &str) -> StorageResult<bool> {
        Self::remove_doc(txn, COUPONS_TABLE, name)
    }

    // ========== Wallets ==========

    pub fn store_wallet(&self, txn: &WriteTransaction, wallet: &Wallet) -> StorageResult<()> {
        Self::put_doc(txn, WALLETS_TABLE, &wallet.user_id, wallet)
    }

    pub fn get_wallet(&self, user_id: &str) -> StorageResult<Option<Wallet>> {
        self.get_doc(WALLETS_TABLE, user_id)
    }

    pub fn get_wallet_txn(&self, txn: &WriteTransaction, user_id: &str) -> StorageResult<Option<Wallet>> {
        Self::get_doc_txn(txn, WALLETS_TABLE, user_id)
    }

    // ========== Carts ==========

    pub fn store_cart(&self, txn: &WriteTransaction, cart: &Cart) -> StorageResult<()> {
        Self::put_doc(txn, CARTS_TABLE, &cart.user_id, cart)
    }

    pub fn get_cart(&self, user_id: &str) -> StorageResult<Option<Cart>> {
        self.get_doc(CARTS_TABLE, user_id)
    }

    pub fn get_cart_txn(&self, txn: &WriteTransaction, user_id: &str) -> StorageResult<Option<Cart>> {
        Self::get_doc_txn(txn, CARTS_TABLE, user_id)
    }

    // ========== Wishlists ==========

    pub fn store_wishlist(&self, txn: &WriteTransaction, wishlist: &Wishlist) -> StorageResult<()> {
        Self::put_doc(txn, WISHLISTS_TABLE, &wishlist.user_id, wishlist)
    }

    pub fn get_wishlist(&self, user_id: &str) -> StorageResult<Option<Wishlist>> {
        self.get_doc(WISHLISTS_TABLE, user_id)
    }

    pub fn get_wishlist_txn(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
    ) -> StorageResult<Option<Wishlist>> {
        Self::get_doc_txn(txn, WISHLISTS_TABLE, user_id)
    }

    // ========== Gateway payments ==========

    pub fn store_gateway_order(&self, txn: &WriteTransaction, order: &GatewayOrder) -> StorageResult<()> {
        Self::put_doc(txn, GATEWAY_ORDERS_TABLE, &order.gateway_order_id, order)
    }

    pub fn get_gateway_order(&self, gateway_order_id: &str) -> StorageResult<Option<GatewayOrder>> {
        self.get_doc(GATEWAY_ORDERS_TABLE, gateway_order_id)
    }

    pub fn get_gateway_order_txn(
        &self,
        txn: &WriteTransaction,
        gateway_order_id: &str,
    ) -> StorageResult<Option<GatewayOrder>> {
        Self::get_doc_txn(txn, GATEWAY_ORDERS_TABLE, gateway_order_id)
    }

    pub fn store_payment(&self, txn: &WriteTransaction, payment: &SettledPayment) -> StorageResult<()> {
        Self::put_doc(txn, PAYMENTS_TABLE, &payment.payment_id, payment)
    }

    pub fn get_payment(&self, payment_id: &str) -> StorageResult<Option<SettledPayment>> {
        self.get_doc(PAYMENTS_TABLE, payment_id)
    }

    pub fn get_payment_txn(
        &self,
        txn: &WriteTransaction,
        payment_id: &str,
    ) -> StorageResult<Option<SettledPayment>> {
        Self::get_doc_txn(txn, PAYMENTS_TABLE, payment_id)
    }

    // ========== Stats ==========

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let orders_table = read_txn.open_table(ORDERS_TABLE)?;
        let products_table = read_txn.open_table(PRODUCTS_TABLE)?;
        let wallets_table = read_txn.open_table(WALLETS_TABLE)?;
        let commands_table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;

        Ok(StorageStats {
            order_count: orders_table.len()?,
            product_count: products_table.len()?,
            wallet_count: wallets_table.len()?,
            processed_command_count: commands_table.len()?,
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub order_count: u64,
    pub product_count: u64,
    pub wallet_count: u64,
    pub processed_command_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ShippingAddress;
    use shared::order::{OrderStatus, PaymentMethod};

    fn create_test_product(id: &str, stock: Option<u32>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            images: vec![],
            price: 100.0,
            discount: 0.0,
            stock,
            is_blocked: false,
            category_id: None,
            created_at: 0,
        }
    }

    fn create_test_order(order_id: &str, user_id: &str, created_on: i64) -> Order {
        Order {
            order_id: order_id.to_string(),
            user_id: user_id.to_string(),
            items: vec![],
            total_order_price: 0.0,
            discount: 0.0,
            delivery_charge: 0.0,
            final_amount: 0.0,
            shipping_address: ShippingAddress::default(),
            payment_method: PaymentMethod::Cod,
            payment: None,
            status: OrderStatus::Pending,
            coupon_name: None,
            coupon_applied: false,
            cancel_reason: None,
            created_on,
            updated_on: created_on,
            delivered_on: None,
            invoice_date: None,
            version: 0,
        }
    }

    #[test]
    fn test_command_idempotency() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let command_id = "cmd-123";

        assert!(!storage.is_command_processed(command_id).unwrap());

        let txn = storage.begin_write().unwrap();
        storage.mark_command_processed(&txn, command_id).unwrap();
        txn.commit().unwrap();

        assert!(storage.is_command_processed(command_id).unwrap());
    }

    #[test]
    fn test_product_storage() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .store_product(&txn, &create_test_product("p-1", Some(3)))
            .unwrap();
        assert_eq!(
            storage.get_product_txn(&txn, "p-1").unwrap().unwrap().stock,
            Some(3)
        );
        txn.commit().unwrap();

        assert!(storage.get_product("p-1").unwrap().is_some());
        assert!(storage.get_product("p-2").unwrap().is_none());
        assert_eq!(storage.get_all_products().unwrap().len(), 1);

        let txn = storage.begin_write().unwrap();
        assert!(storage.remove_product(&txn, "p-1").unwrap());
        assert!(!storage.remove_product(&txn, "p-1").unwrap());
        txn.commit().unwrap();
        assert!(storage.get_product("p-1").unwrap().is_none());
    }

    #[test]
    fn test_orders_for_user_newest_first() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, &create_test_order("o-1", "u-1", 10)).unwrap();
        storage.store_order(&txn, &create_test_order("o-2", "u-2", 20)).unwrap();
        storage.store_order(&txn, &create_test_order("o-3", "u-1", 30)).unwrap();
        txn.commit().unwrap();

        let ids: Vec<String> = storage
            .get_orders_for_user("u-1")
            .unwrap()
            .into_iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(ids, vec!["o-3".to_string(), "o-1".to_string()]);

        let stats = storage.get_stats().unwrap();
        assert_eq!(stats.order_count, 3);
    }

    #[test]
    fn test_dropped_transaction_writes_nothing() {
        let storage = OrderStorage::open_in_memory().unwrap();

        {
            let txn = storage.begin_write().unwrap();
            storage
                .store_product(&txn, &create_test_product("p-1", None))
                .unwrap();
            storage.mark_command_processed(&txn, "cmd-1").unwrap();
            // dropped without commit
        }

        assert!(storage.get_product("p-1").unwrap().is_none());
        assert!(!storage.is_command_processed("cmd-1").unwrap());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.redb");

        {
            let storage = OrderStorage::open(&path).unwrap();
            let txn = storage.begin_write().unwrap();
            storage
                .store_wallet(&txn, &Wallet::new("u-1", 0))
                .unwrap();
            txn.commit().unwrap();
        }

        let storage = OrderStorage::open(&path).unwrap();
        assert!(storage.get_wallet("u-1").unwrap().is_some());
    }
}
