//! Command execution primitives
//!
//! - [`CommandContext`]: documents loaded and staged inside one write transaction
//! - [`CommandHandler`]: implemented by every order action
//! - [`OrderError`]: domain rejections raised by actions

use std::collections::{BTreeSet, HashMap};

use redb::WriteTransaction;
use shared::models::{Cart, Category, Coupon, GatewayOrder, Product, SettledPayment, Wallet};
use shared::order::{Actor, CommandErrorCode, Order, OrderStatus};
use thiserror::Error;

use super::storage::{OrderStorage, StorageError};
use crate::coupons::CouponRejection;
use crate::pricing::PricingConfig;
use crate::stock::StockError;
use crate::wallet::WalletError;

/// Domain errors raised while executing a command
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Cart is empty")]
    CartEmpty,

    #[error("Item {0} is already cancelled")]
    ItemAlreadyCancelled(String),

    #[error("Order {0} is already cancelled")]
    OrderAlreadyCancelled(String),

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Item {0} is not eligible for return")]
    NotEligibleForReturn(String),

    #[error("Return for item {0} has not been approved")]
    ReturnNotApproved(String),

    #[error("Order version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Online payment requires gateway payment details")]
    PaymentRequired,

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Coupon(#[from] CouponRejection),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl OrderError {
    /// Stable code reported to clients
    pub fn code(&self) -> CommandErrorCode {
        match self {
            Self::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
            Self::ItemNotFound(_) => CommandErrorCode::ItemNotFound,
            Self::ProductNotFound(_) => CommandErrorCode::ProductNotFound,
            Self::CartEmpty => CommandErrorCode::CartEmpty,
            Self::ItemAlreadyCancelled(_) => CommandErrorCode::ItemAlreadyCancelled,
            Self::OrderAlreadyCancelled(_) => CommandErrorCode::OrderAlreadyCancelled,
            Self::InvalidTransition { .. } => CommandErrorCode::InvalidTransition,
            Self::NotEligibleForReturn(_) => CommandErrorCode::NotEligibleForReturn,
            Self::ReturnNotApproved(_) => CommandErrorCode::ReturnNotApproved,
            Self::VersionConflict { .. } => CommandErrorCode::VersionConflict,
            Self::PaymentRequired => CommandErrorCode::PaymentRequired,
            Self::Stock(e) => e.code(),
            Self::Wallet(e) => e.code(),
            Self::Coupon(e) => e.code(),
            Self::InvalidAmount(_) => CommandErrorCode::InvalidAmount,
            Self::PermissionDenied(_) => CommandErrorCode::PermissionDenied,
            Self::InvalidOperation(_) => CommandErrorCode::InvalidOperation,
            Self::Storage(_) => CommandErrorCode::InternalError,
        }
    }
}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        OrderError::Storage(err.to_string())
    }
}

/// Command metadata passed to every action
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor: Actor,
    pub timestamp: i64,
}

/// Store policy the actions apply
#[derive(Debug, Clone, Copy)]
pub struct OrderPolicy {
    pub pricing: PricingConfig,
    /// Days after delivery during which a return may be requested
    pub return_window_days: u32,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            return_window_days: 7,
        }
    }
}

/// What an action reports back to the manager
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub order_id: String,
    /// Wallet credit settled by this command
    pub refunded: Option<f64>,
}

impl ActionOutcome {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            refunded: None,
        }
    }

    pub fn with_refund(mut self, amount: f64) -> Self {
        if amount > 0.0 {
            self.refunded = Some(amount);
        }
        self
    }
}

/// Implemented by every order action
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError>;
}

/// Documents of one kind read through the transaction, plus which were changed
struct Staged<T> {
    docs: HashMap<String, T>,
    dirty: BTreeSet<String>,
}

impl<T: Clone> Staged<T> {
    fn new() -> Self {
        Self {
            docs: HashMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    fn get(&self, key: &str) -> Option<T> {
        self.docs.get(key).cloned()
    }

    fn stage(&mut self, key: String, doc: T) {
        self.dirty.insert(key.clone());
        self.docs.insert(key, doc);
    }

    fn modified(&self) -> impl Iterator<Item = &T> {
        self.dirty.iter().filter_map(|k| self.docs.get(k))
    }
}

/// Per-command view over the write transaction
///
/// Loads return clones; changes become visible to later loads of the same
/// command through `save_*` and are persisted by the manager before commit.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    orders: Staged<Order>,
    products: Staged<Product>,
    coupons: Staged<Coupon>,
    wallets: Staged<Wallet>,
    carts: Staged<Cart>,
    gateway_orders: Staged<GatewayOrder>,
    payments: Staged<SettledPayment>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage) -> Self {
        Self {
            txn,
            storage,
            orders: Staged::new(),
            products: Staged::new(),
            coupons: Staged::new(),
            wallets: Staged::new(),
            carts: Staged::new(),
            gateway_orders: Staged::new(),
            payments: Staged::new(),
        }
    }

    // ========== Orders ==========

    pub fn load_order(&mut self, order_id: &str) -> Result<Order, OrderError> {
        if let Some(order) = self.orders.get(order_id) {
            return Ok(order);
        }
        let order = self
            .storage
            .get_order_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        self.orders.docs.insert(order_id.to_string(), order.clone());
        Ok(order)
    }

    /// Load an order the actor is allowed to touch; other users' orders look missing
    pub fn load_order_for(&mut self, order_id: &str, actor: &Actor) -> Result<Order, OrderError> {
        let order = self.load_order(order_id)?;
        if !actor.can_access(&order.user_id) {
            return Err(OrderError::OrderNotFound(order_id.to_string()));
        }
        Ok(order)
    }

    pub fn save_order(&mut self, order: Order) {
        self.orders.stage(order.order_id.clone(), order);
    }

    pub fn modified_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.modified()
    }

    // ========== Catalog ==========

    pub fn find_product(&mut self, product_id: &str) -> Result<Option<Product>, OrderError> {
        if let Some(product) = self.products.get(product_id) {
            return Ok(Some(product));
        }
        let product = self.storage.get_product_txn(self.txn, product_id)?;
        if let Some(p) = &product {
            self.products.docs.insert(product_id.to_string(), p.clone());
        }
        Ok(product)
    }

    pub fn load_product(&mut self, product_id: &str) -> Result<Product, OrderError> {
        self.find_product(product_id)?
            .ok_or_else(|| OrderError::ProductNotFound(product_id.to_string()))
    }

    pub fn save_product(&mut self, product: Product) {
        self.products.stage(product.id.clone(), product);
    }

    pub fn modified_products(&self) -> impl Iterator<Item = &Product> {
        self.products.modified()
    }

    /// Categories are read-only for commands
    pub fn find_category(&mut self, category_id: &str) -> Result<Option<Category>, OrderError> {
        Ok(self.storage.get_category_txn(self.txn, category_id)?)
    }

    // ========== Coupons ==========

    pub fn find_coupon(&mut self, code: &str) -> Result<Option<Coupon>, OrderError> {
        if let Some(coupon) = self.coupons.get(code) {
            return Ok(Some(coupon));
        }
        let coupon = self.storage.get_coupon_txn(self.txn, code)?;
        if let Some(c) = &coupon {
            self.coupons.docs.insert(code.to_string(), c.clone());
        }
        Ok(coupon)
    }

    pub fn save_coupon(&mut self, coupon: Coupon) {
        self.coupons.stage(coupon.name.clone(), coupon);
    }

    pub fn modified_coupons(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.modified()
    }

    // ========== Wallets ==========

    /// Load a wallet, creating an empty one in memory when the user has none yet
    pub fn load_wallet(&mut self, user_id: &str, now: i64) -> Result<Wallet, OrderError> {
        if let Some(wallet) = self.wallets.get(user_id) {
            return Ok(wallet);
        }
        let wallet = self
            .storage
            .get_wallet_txn(self.txn, user_id)?
            .unwrap_or_else(|| Wallet::new(user_id, now));
        self.wallets.docs.insert(user_id.to_string(), wallet.clone());
        Ok(wallet)
    }

    pub fn save_wallet(&mut self, wallet: Wallet) {
        self.wallets.stage(wallet.user_id.clone(), wallet);
    }

    pub fn modified_wallets(&self) -> impl Iterator<Item = &Wallet> {
        self.wallets.modified()
    }

    // ========== Carts ==========

    pub fn find_cart(&mut self, user_id: &str) -> Result<Option<Cart>, OrderError> {
        if let Some(cart) = self.carts.get(user_id) {
            return Ok(Some(cart));
        }
        let cart = self.storage.get_cart_txn(self.txn, user_id)?;
        if let Some(c) = &cart {
            self.carts.docs.insert(user_id.to_string(), c.clone());
        }
        Ok(cart)
    }

    pub fn save_cart(&mut self, cart: Cart) {
        self.carts.stage(cart.user_id.clone(), cart);
    }

    pub fn modified_carts(&self) -> impl Iterator<Item = &Cart> {
        self.carts.modified()
    }

    // ========== Gateway payments ==========

    pub fn find_gateway_order(&mut self, gateway_order_id: &str) -> Result<Option<GatewayOrder>, OrderError> {
        if let Some(opened) = self.gateway_orders.get(gateway_order_id) {
            return Ok(Some(opened));
        }
        let opened = self.storage.get_gateway_order_txn(self.txn, gateway_order_id)?;
        if let Some(o) = &opened {
            self.gateway_orders.docs.insert(gateway_order_id.to_string(), o.clone());
        }
        Ok(opened)
    }

    pub fn save_gateway_order(&mut self, opened: GatewayOrder) {
        self.gateway_orders.stage(opened.gateway_order_id.clone(), opened);
    }

    pub fn modified_gateway_orders(&self) -> impl Iterator<Item = &GatewayOrder> {
        self.gateway_orders.modified()
    }

    /// Settlement already recorded for a payment id, by any customer
    pub fn find_payment(&mut self, payment_id: &str) -> Result<Option<SettledPayment>, OrderError> {
        if let Some(settled) = self.payments.get(payment_id) {
            return Ok(Some(settled));
        }
        Ok(self.storage.get_payment_txn(self.txn, payment_id)?)
    }

    pub fn save_payment(&mut self, settled: SettledPayment) {
        self.payments.stage(settled.payment_id.clone(), settled);
    }

    pub fn modified_payments(&self) -> impl Iterator<Item = &SettledPayment> {
        self.payments.modified()
    }
}
