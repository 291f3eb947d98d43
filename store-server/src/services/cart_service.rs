//! Cart Service
//!
//! Carts hold at most `max_quantity` units of a product and never more than
//! the product's stock. Each line keeps the discounted unit price taken at its
//! last change; the cart view always re-prices from the current catalog.
//! Online checkout opens a gateway order for the cart's current final amount.

use redb::WriteTransaction;
use serde::Serialize;
use shared::models::{
    Cart, CartAdd, CartItem, CartQuantityUpdate, CheckoutPaymentRequest, GatewayOrder, PaymentPurpose,
    Product, QuantityChange,
};

use super::{ServiceError, ServiceResult};
use crate::coupons;
use crate::orders::money::{to_decimal, to_f64};
use crate::orders::{OrderStorage, StorageError};
use crate::pricing::{self, PriceSummary, PricedLine, PricingConfig};
use crate::wallet::gateway;

/// Default per-product quantity limit
pub const DEFAULT_MAX_CART_QUANTITY: u32 = 5;

/// One priced cart line
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: PricedLine,
    /// Product can currently be bought in this quantity
    pub available: bool,
}

/// Cart with current prices and the order summary
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub summary: PriceSummary,
}

#[derive(Debug, Clone)]
pub struct CartService {
    storage: OrderStorage,
    pricing: PricingConfig,
    max_quantity: u32,
}

impl CartService {
    pub fn new(storage: OrderStorage, pricing: PricingConfig, max_quantity: u32) -> Self {
        Self {
            storage,
            pricing,
            max_quantity,
        }
    }

    /// Add units of a product, merging with an existing line
    pub fn add(&self, user_id: &str, req: &CartAdd, now: i64) -> ServiceResult<Cart> {
        if req.quantity == 0 {
            return Err(ServiceError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.storage.begin_write()?;
        let product = self
            .storage
            .get_product_txn(&txn, &req.product_id)?
            .ok_or_else(|| ServiceError::ProductNotFound(req.product_id.clone()))?;
        if product.is_blocked {
            return Err(ServiceError::ProductBlocked(product.id));
        }
        if !product.in_stock() {
            return Err(ServiceError::OutOfStock(product.id));
        }

        let mut cart = self
            .storage
            .get_cart_txn(&txn, user_id)?
            .unwrap_or_else(|| Cart::new(user_id, now));
        let current = cart.find_item(&product.id).map_or(0, |i| i.quantity);
        let quantity = current.saturating_add(req.quantity);
        self.check_quantity(&product, quantity)?;

        let unit_price = self.unit_price(&txn, &product)?;
        match cart.find_item_mut(&product.id) {
            Some(item) => set_line(item, quantity, unit_price),
            None => cart.items.push(CartItem {
                product_id: product.id.clone(),
                quantity,
                price: unit_price,
                total_price: pricing::line_total(unit_price, quantity),
            }),
        }
        cart.updated_at = now;

        self.storage.store_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(user_id = %user_id, product_id = %product.id, quantity, "Cart line added");
        Ok(cart)
    }

    /// Step a line up or down by one unit
    ///
    /// Stepping down from one unit removes the line. A line whose product
    /// was deleted or sold out is dropped from the cart (and the drop is
    /// committed) before the error is returned.
    pub fn change_quantity(
        &self,
        user_id: &str,
        update: &CartQuantityUpdate,
        now: i64,
    ) -> ServiceResult<Cart> {
        let txn = self.storage.begin_write()?;
        let mut cart = self
            .storage
            .get_cart_txn(&txn, user_id)?
            .ok_or_else(|| ServiceError::CartItemNotFound(update.product_id.clone()))?;
        let current = cart
            .find_item(&update.product_id)
            .map(|i| i.quantity)
            .ok_or_else(|| ServiceError::CartItemNotFound(update.product_id.clone()))?;

        let product = match self.storage.get_product_txn(&txn, &update.product_id)? {
            Some(p) if p.in_stock() => p,
            other => {
                let err = match other {
                    Some(p) => ServiceError::OutOfStock(p.id),
                    None => ServiceError::ProductNotFound(update.product_id.clone()),
                };
                cart.remove_item(&update.product_id);
                cart.updated_at = now;
                self.storage.store_cart(&txn, &cart)?;
                txn.commit().map_err(StorageError::from)?;
                tracing::info!(user_id = %user_id, product_id = %update.product_id, "Unavailable product dropped from cart");
                return Err(err);
            }
        };

        let quantity = match update.change {
            QuantityChange::Increase => {
                if product.is_blocked {
                    return Err(ServiceError::ProductBlocked(product.id));
                }
                let quantity = current.saturating_add(1);
                self.check_quantity(&product, quantity)?;
                quantity
            }
            QuantityChange::Decrease => current.saturating_sub(1),
        };

        if quantity == 0 {
            cart.remove_item(&product.id);
        } else {
            let unit_price = self.unit_price(&txn, &product)?;
            if let Some(item) = cart.find_item_mut(&product.id) {
                set_line(item, quantity, unit_price);
            }
        }
        cart.updated_at = now;

        self.storage.store_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    pub fn remove(&self, user_id: &str, product_id: &str, now: i64) -> ServiceResult<Cart> {
        let txn = self.storage.begin_write()?;
        let mut cart = self
            .storage
            .get_cart_txn(&txn, user_id)?
            .ok_or_else(|| ServiceError::CartItemNotFound(product_id.to_string()))?;
        if !cart.remove_item(product_id) {
            return Err(ServiceError::CartItemNotFound(product_id.to_string()));
        }
        cart.updated_at = now;

        self.storage.store_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    /// Current prices of the cart; deleted products are skipped
    pub fn view(&self, user_id: &str) -> ServiceResult<CartView> {
        let Some(cart) = self.storage.get_cart(user_id)? else {
            return Ok(CartView {
                items: Vec::new(),
                summary: PriceSummary::default(),
            });
        };

        let items = price_cart(&self.storage, &cart)?;
        let lines: Vec<PricedLine> = items.iter().map(|i| i.line.clone()).collect();
        Ok(CartView {
            summary: pricing::summarize_cart(&lines, &self.pricing),
            items,
        })
    }

    /// Open a gateway order for paying the current cart online
    ///
    /// The amount is what placing the order right now would charge, coupon
    /// included; placement fails if the cart or prices change in between.
    pub fn open_checkout_payment(
        &self,
        user_id: &str,
        req: &CheckoutPaymentRequest,
        now: i64,
    ) -> ServiceResult<GatewayOrder> {
        let amount = checkout_amount(
            &self.storage,
            &self.pricing,
            user_id,
            req.coupon_code.as_deref(),
            now,
        )?;
        if amount <= 0.0 {
            return Err(ServiceError::Validation(
                "nothing to pay online for this cart".to_string(),
            ));
        }
        let opened = gateway::open_order(user_id, PaymentPurpose::Checkout, amount, now);

        let txn = self.storage.begin_write()?;
        self.storage.store_gateway_order(&txn, &opened)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            user_id = %user_id,
            gateway_order_id = %opened.gateway_order_id,
            amount,
            "Checkout payment opened"
        );
        Ok(opened)
    }

    fn check_quantity(&self, product: &Product, quantity: u32) -> ServiceResult<()> {
        if quantity > self.max_quantity {
            return Err(ServiceError::QuantityLimit {
                max: self.max_quantity,
            });
        }
        if let Some(available) = product.stock
            && quantity > available
        {
            return Err(ServiceError::InsufficientStock {
                product_id: product.id.clone(),
                available,
            });
        }
        Ok(())
    }

    fn unit_price(&self, txn: &WriteTransaction, product: &Product) -> ServiceResult<f64> {
        let category = match product.category_id.as_deref() {
            Some(category_id) => self.storage.get_category_txn(txn, category_id)?,
            None => None,
        };
        Ok(pricing::price_line(product, category.as_ref(), 1).unit_price)
    }
}

fn set_line(item: &mut CartItem, quantity: u32, unit_price: f64) {
    item.quantity = quantity;
    item.price = unit_price;
    item.total_price = pricing::line_total(unit_price, quantity);
}

/// Final amount placing an order from the cart would charge right now
pub(crate) fn checkout_amount(
    storage: &OrderStorage,
    config: &PricingConfig,
    user_id: &str,
    coupon_code: Option<&str>,
    now: i64,
) -> ServiceResult<f64> {
    let cart = storage
        .get_cart(user_id)?
        .filter(|c| !c.is_empty())
        .ok_or(ServiceError::CartEmpty)?;
    let mut lines = Vec::with_capacity(cart.items.len());
    for item in price_cart(storage, &cart)? {
        if !item.available {
            let product_id = item.line.product_id;
            return Err(match storage.get_product(&product_id)? {
                Some(p) if p.is_blocked => ServiceError::ProductBlocked(product_id),
                p => ServiceError::InsufficientStock {
                    product_id,
                    available: p.and_then(|p| p.stock).unwrap_or(0),
                },
            });
        }
        lines.push(item.line);
    }
    let summary = pricing::summarize_cart(&lines, config);

    let mut discount = 0.0;
    if let Some(code) = coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        let coupon = storage.get_coupon(code)?;
        discount = coupons::validate(coupon.as_ref(), code, user_id, summary.subtotal, now)?.discount;
    }
    Ok(to_f64(
        (to_decimal(summary.subtotal) - to_decimal(discount) + to_decimal(summary.shipping_charge))
            .max(rust_decimal::Decimal::ZERO),
    ))
}

/// Price every line of a cart against the current catalog
pub(crate) fn price_cart(storage: &OrderStorage, cart: &Cart) -> ServiceResult<Vec<CartLineView>> {
    let mut items = Vec::with_capacity(cart.items.len());
    for entry in &cart.items {
        let Some(product) = storage.get_product(&entry.product_id)? else {
            continue;
        };
        let category = match product.category_id.as_deref() {
            Some(category_id) => storage.get_category(category_id)?,
            None => None,
        };
        let available = !product.is_blocked && product.stock.is_none_or(|s| s >= entry.quantity);
        items.push(CartLineView {
            line: pricing::price_line(&product, category.as_ref(), entry.quantity),
            available,
        });
    }
    Ok(items)
}
