//! Test fixtures shared by action and manager tests

use shared::models::{
    Cart, CartItem, Category, Coupon, CouponUsage, GatewayOrder, PaymentPurpose, Product, ShippingAddress,
    Wallet,
};
use shared::order::{Actor, Order, OrderStatus, OrderedItem, PaymentMethod};

use super::storage::OrderStorage;
use super::traits::CommandMetadata;

pub const NOW: i64 = 1_700_000_000_000;

pub fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Anna Varghese".to_string(),
        phone: "9876543210".to_string(),
        address: "12 Canal Road".to_string(),
        town: Some("Edappally".to_string()),
        city: "Kochi".to_string(),
        state: "Kerala".to_string(),
        country: "India".to_string(),
        pincode: "682024".to_string(),
    }
}

pub fn product(id: &str, price: f64, stock: Option<u32>) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        images: vec![format!("{}.jpg", id)],
        price,
        discount: 0.0,
        stock,
        is_blocked: false,
        category_id: None,
        created_at: 0,
    }
}

pub fn category(id: &str, offer: f64) -> Category {
    Category {
        id: id.to_string(),
        name: format!("Category {}", id),
        category_offer: offer,
        is_listed: true,
    }
}

pub fn general_coupon(name: &str, offer: f64, max: Option<f64>) -> Coupon {
    Coupon {
        name: name.to_string(),
        offer_price: offer,
        minimum_price: 0.0,
        max_price: max,
        created_on: 0,
        expire_on: NOW + 86_400_000,
        is_listed: true,
        usage: CouponUsage::General {
            redeemed_by: vec![],
        },
    }
}

pub fn item(item_id: &str, product_id: &str, price: f64, quantity: u32, status: OrderStatus) -> OrderedItem {
    OrderedItem {
        item_id: item_id.to_string(),
        product_id: product_id.to_string(),
        product_name: format!("Product {}", product_id),
        product_images: vec![],
        regular_price: price,
        quantity,
        price,
        total_product_price: price * quantity as f64,
        status,
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
    }
}

/// Order with totals consistent with its items and no shipping charge
pub fn order(order_id: &str, user_id: &str, payment_method: PaymentMethod, items: Vec<OrderedItem>) -> Order {
    let total: f64 = items.iter().map(|i| i.total_product_price).sum();
    Order {
        order_id: order_id.to_string(),
        user_id: user_id.to_string(),
        items,
        total_order_price: total,
        discount: 0.0,
        delivery_charge: 0.0,
        final_amount: total,
        shipping_address: address(),
        payment_method,
        payment: None,
        status: OrderStatus::Pending,
        coupon_name: None,
        coupon_applied: false,
        cancel_reason: None,
        created_on: NOW,
        updated_on: NOW,
        delivered_on: None,
        invoice_date: Some(NOW),
        version: 1,
    }
}

pub fn cart(user_id: &str, lines: &[(&str, u32, f64)]) -> Cart {
    Cart {
        user_id: user_id.to_string(),
        items: lines
            .iter()
            .map(|(product_id, quantity, price)| CartItem {
                product_id: product_id.to_string(),
                quantity: *quantity,
                price: *price,
                total_price: price * *quantity as f64,
            })
            .collect(),
        updated_at: 0,
    }
}

pub fn metadata(actor: Actor) -> CommandMetadata {
    CommandMetadata {
        command_id: "cmd-1".to_string(),
        actor,
        timestamp: NOW,
    }
}

pub fn seed_products(storage: &OrderStorage, products: &[Product]) {
    let txn = storage.begin_write().unwrap();
    for p in products {
        storage.store_product(&txn, p).unwrap();
    }
    txn.commit().unwrap();
}

pub fn seed_category(storage: &OrderStorage, category: &Category) {
    let txn = storage.begin_write().unwrap();
    storage.store_category(&txn, category).unwrap();
    txn.commit().unwrap();
}

pub fn seed_order(storage: &OrderStorage, order: &Order) {
    let txn = storage.begin_write().unwrap();
    storage.store_order(&txn, order).unwrap();
    txn.commit().unwrap();
}

pub fn seed_cart(storage: &OrderStorage, cart: &Cart) {
    let txn = storage.begin_write().unwrap();
    storage.store_cart(&txn, cart).unwrap();
    txn.commit().unwrap();
}

pub fn seed_coupon(storage: &OrderStorage, coupon: &Coupon) {
    let txn = storage.begin_write().unwrap();
    storage.store_coupon(&txn, coupon).unwrap();
    txn.commit().unwrap();
}

pub fn seed_wallet_balance(storage: &OrderStorage, user_id: &str, balance: f64) {
    let mut wallet = Wallet::new(user_id, 0);
    crate::wallet::credit(
        &mut wallet,
        balance,
        shared::models::TransactionPurpose::Add,
        "Seed",
        crate::wallet::Posting::default(),
        0,
    )
    .unwrap();
    let txn = storage.begin_write().unwrap();
    storage.store_wallet(&txn, &wallet).unwrap();
    txn.commit().unwrap();
}

/// Checkout gateway order opened for `amount`, not yet paid
pub fn seed_checkout_payment(storage: &OrderStorage, gateway_order_id: &str, user_id: &str, amount: f64) {
    let txn = storage.begin_write().unwrap();
    storage
        .store_gateway_order(
            &txn,
            &GatewayOrder {
                gateway_order_id: gateway_order_id.to_string(),
                user_id: user_id.to_string(),
                purpose: PaymentPurpose::Checkout,
                amount,
                currency: crate::wallet::gateway::CURRENCY.to_string(),
                created_at: NOW,
                payment_id: None,
                settled_at: None,
            },
        )
        .unwrap();
    txn.commit().unwrap();
}
