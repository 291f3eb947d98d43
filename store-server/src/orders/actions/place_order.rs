//! PlaceOrder command handler
//!
//! Turns the customer's cart into an order. Every line is priced and checked
//! against stock before anything is taken, so a failing line leaves the cart,
//! the stock, the coupon and the wallet as they were. An online payment must
//! settle a checkout gateway order opened for exactly the order's final amount.

use rust_decimal::Decimal;
use shared::models::{PaymentPurpose, ShippingAddress, TransactionPurpose};
use shared::order::{Order, OrderStatus, OrderedItem, PaymentMethod, PaymentReference};
use shared::util::new_id;

use crate::coupons;
use crate::orders::money::{to_decimal, to_f64};
use crate::orders::reducer::recompute_order_totals;
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::pricing::{self, PricedLine, PricingConfig};
use crate::stock;
use crate::wallet::{self, Posting, WalletError, gateway};

/// PlaceOrder action
#[derive(Debug, Clone)]
pub struct PlaceOrderAction {
    pub address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    /// Verified gateway payment (online orders)
    pub payment: Option<PaymentReference>,
    pub pricing: PricingConfig,
}

impl CommandHandler for PlaceOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        let user_id = metadata.actor.id().to_string();
        let now = metadata.timestamp;

        if self.payment_method == PaymentMethod::Online && self.payment.is_none() {
            return Err(OrderError::PaymentRequired);
        }

        // 1. Load the cart
        let mut cart = ctx
            .find_cart(&user_id)?
            .filter(|c| !c.is_empty())
            .ok_or(OrderError::CartEmpty)?;

        // 2. Price every line and check availability before taking anything
        let mut products = Vec::with_capacity(cart.items.len());
        let mut lines: Vec<PricedLine> = Vec::with_capacity(cart.items.len());
        for entry in &cart.items {
            let product = ctx.load_product(&entry.product_id)?;
            stock::check_available(&product, entry.quantity)?;
            let category = match product.category_id.as_deref() {
                Some(category_id) => ctx.find_category(category_id)?,
                None => None,
            };
            lines.push(pricing::price_line(&product, category.as_ref(), entry.quantity));
            products.push(product);
        }
        let summary = pricing::summarize_cart(&lines, &self.pricing);

        // 3. Coupon, applied to the goods subtotal
        let mut discount = 0.0;
        let mut coupon_name = None;
        if let Some(code) = self
            .coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            let coupon = ctx.find_coupon(code)?;
            let quote = coupons::validate(coupon.as_ref(), code, &user_id, summary.subtotal, now)?;
            if let Some(mut coupon) = coupon {
                coupons::redeem(&mut coupon, &user_id);
                ctx.save_coupon(coupon);
            }
            discount = quote.discount;
            coupon_name = Some(quote.code);
        }

        let final_amount = to_f64(
            (to_decimal(summary.subtotal) - to_decimal(discount)
                + to_decimal(summary.shipping_charge))
            .max(Decimal::ZERO),
        );
        let order_id = new_id();

        // 4. Online payment, settled once for the amount due
        if self.payment_method == PaymentMethod::Online {
            let payment = self.payment.as_ref().ok_or(OrderError::PaymentRequired)?;
            settle_online(ctx, payment, &user_id, &order_id, final_amount, now)?;
        }

        // 5. Wallet payment
        if self.payment_method == PaymentMethod::Wallet && final_amount > 0.0 {
            let mut wallet = ctx.load_wallet(&user_id, now)?;
            wallet::debit(
                &mut wallet,
                final_amount,
                TransactionPurpose::Purchase,
                format!("Payment for order {}", order_id),
                Posting::for_order(&order_id),
                now,
            )?;
            ctx.save_wallet(wallet);
        }

        // 6. Take the stock
        for (mut product, line) in products.into_iter().zip(&lines) {
            stock::reserve(&mut product, line.quantity)?;
            ctx.save_product(product);
        }

        // 7. Create the order
        let items = lines
            .iter()
            .map(|line| OrderedItem {
                item_id: new_id(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                product_images: line.images.clone(),
                regular_price: line.regular_price,
                quantity: line.quantity,
                price: line.unit_price,
                total_product_price: line.line_total,
                status: OrderStatus::Pending,
                request_status: None,
                cancel_reason: None,
                cancelled_at: None,
                return_reason: None,
                return_description: None,
                return_images: vec![],
                return_requested_at: None,
                rejection_category: None,
                rejection_reason: None,
                returned_on: None,
                delivered_on: None,
                updated_on: None,
                refunded_amount: None,
                restocked: false,
            })
            .collect();

        let mut order = Order {
            order_id: order_id.clone(),
            user_id: user_id.clone(),
            items,
            total_order_price: summary.subtotal,
            discount,
            delivery_charge: summary.shipping_charge,
            final_amount,
            shipping_address: self.address.clone(),
            payment_method: self.payment_method,
            payment: self.payment.clone(),
            status: OrderStatus::Pending,
            coupon_applied: coupon_name.is_some(),
            coupon_name,
            cancel_reason: None,
            created_on: now,
            updated_on: now,
            delivered_on: None,
            invoice_date: Some(now),
            version: 0,
        };
        recompute_order_totals(&mut order);

        // 8. Empty the cart
        cart.items.clear();
        cart.updated_at = now;
        ctx.save_cart(cart);

        tracing::debug!(
            order_id = %order.order_id,
            user_id = %user_id,
            final_amount = order.final_amount,
            payment_method = ?order.payment_method,
            "Order placed"
        );
        ctx.save_order(order);

        Ok(ActionOutcome::new(order_id))
    }
}

fn settle_online(
    ctx: &mut CommandContext<'_>,
    payment: &PaymentReference,
    user_id: &str,
    order_id: &str,
    amount_due: f64,
    now: i64,
) -> Result<(), OrderError> {
    let mut opened = ctx
        .find_gateway_order(&payment.gateway_order_id)?
        .ok_or_else(|| WalletError::GatewayOrderNotFound(payment.gateway_order_id.clone()))?;
    let previous = ctx.find_payment(&payment.payment_id)?;
    let mut settled = gateway::settle(
        &mut opened,
        previous.as_ref(),
        payment,
        user_id,
        PaymentPurpose::Checkout,
        now,
    )?;
    gateway::check_amount(&opened, amount_due)?;

    settled.order_id = Some(order_id.to_string());
    ctx.save_gateway_order(opened);
    ctx.save_payment(settled);
    Ok(())
}
