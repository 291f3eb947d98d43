use std::sync::Arc;

use crate::core::{Config, Result, ServerError};
use crate::orders::{OrderStorage, OrdersManager};
use crate::services::{CartService, CatalogService, CouponService, WalletService, WishlistService};
use crate::wallet::PaymentGateway;

/// Server state shared by every handler
///
/// Cloning is cheap: the manager sits behind an `Arc` and every service holds
/// a handle to the same redb database.
///
/// | Field | |
/// |-------|---|
/// | orders | order commands and reads |
/// | cart / wishlist | customer lists |
/// | coupons | coupon admin, apply and availability |
/// | wallet | wallet view and top-up |
/// | catalog | product/category seeding |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub orders: Arc<OrdersManager>,
    pub cart: CartService,
    pub wishlist: WishlistService,
    pub coupons: CouponService,
    pub wallet: WalletService,
    pub catalog: CatalogService,
}

impl ServerState {
    /// Open the store under `work_dir` and build every service on it
    pub fn initialize(config: &Config) -> Result<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(ServerError::WorkDir)?;

        if config.payment_key_secret.is_empty() {
            tracing::warn!("PAYMENT_KEY_SECRET is not set; online payments will fail verification");
        }

        let db_path = config.database_path();
        tracing::info!(path = %db_path.display(), "Opening store");
        let manager = OrdersManager::new(
            &db_path,
            config.order_policy(),
            PaymentGateway::new(config.payment_key_secret.clone()),
        )?;

        Ok(Self::with_manager(config.clone(), manager))
    }

    /// Build the services on an already opened manager
    pub fn with_manager(config: Config, manager: OrdersManager) -> Self {
        let storage: OrderStorage = manager.storage().clone();
        let gateway = manager.gateway().clone();
        let pricing = config.pricing();

        Self {
            cart: CartService::new(storage.clone(), pricing, config.max_cart_quantity),
            wishlist: WishlistService::new(storage.clone()),
            coupons: CouponService::new(storage.clone(), pricing),
            wallet: WalletService::new(storage.clone(), gateway),
            catalog: CatalogService::new(storage),
            orders: Arc::new(manager),
            config,
        }
    }

    pub fn storage(&self) -> &OrderStorage {
        self.orders.storage()
    }
}
