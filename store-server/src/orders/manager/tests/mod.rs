use super::*;
use crate::orders::fixtures::*;
use crate::wallet;
use shared::models::Coupon;
use shared::order::{CommandErrorCode, GatewayPayment, OrderStatus, ReturnDecision};

const GATEWAY_SECRET: &str = "test_gateway_secret";

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(
        storage,
        OrderPolicy::default(),
        PaymentGateway::new(GATEWAY_SECRET),
    )
}

fn customer_cmd(user_id: &str, payload: OrderCommandPayload) -> OrderCommand {
    let mut cmd = OrderCommand::new(Actor::customer(user_id), payload);
    cmd.timestamp = NOW;
    cmd
}

fn admin_cmd(payload: OrderCommandPayload) -> OrderCommand {
    let mut cmd = OrderCommand::new(Actor::admin("admin-1"), payload);
    cmd.timestamp = NOW;
    cmd
}

fn place_payload(payment_method: PaymentMethod, coupon_code: Option<&str>) -> OrderCommandPayload {
    OrderCommandPayload::PlaceOrder {
        address: address(),
        payment_method,
        coupon_code: coupon_code.map(String::from),
        payment: None,
    }
}

/// Gateway confirmation signed with the test secret
fn signed_payment(gateway_order_id: &str, payment_id: &str) -> GatewayPayment {
    let signature = PaymentGateway::new(GATEWAY_SECRET)
        .sign(gateway_order_id, payment_id)
        .unwrap();
    GatewayPayment {
        gateway_order_id: gateway_order_id.to_string(),
        payment_id: payment_id.to_string(),
        signature,
    }
}

// ========================================================================
// Helper: seed a cart and place an order from it
// ========================================================================

fn place_order_with(
    manager: &OrdersManager,
    user_id: &str,
    lines: &[(&str, u32, f64)],
    payload: OrderCommandPayload,
) -> Order {
    seed_cart(manager.storage(), &cart(user_id, lines));
    let resp = manager.execute_command(customer_cmd(user_id, payload));
    assert!(resp.success, "Failed to place order: {:?}", resp.error);
    let order_id = resp.order_id.unwrap();
    manager.storage().get_order(&order_id).unwrap().unwrap()
}

/// Open a checkout gateway order for the user's current cart total
fn open_checkout(manager: &OrdersManager, user_id: &str, gateway_order_id: &str) -> f64 {
    let amount = crate::services::cart_service::checkout_amount(
        manager.storage(),
        &manager.policy().pricing,
        user_id,
        None,
        NOW,
    )
    .unwrap();
    seed_checkout_payment(manager.storage(), gateway_order_id, user_id, amount);
    amount
}

fn place_order(
    manager: &OrdersManager,
    user_id: &str,
    lines: &[(&str, u32, f64)],
    payment_method: PaymentMethod,
) -> Order {
    let payload = match payment_method {
        PaymentMethod::Online => {
            seed_cart(manager.storage(), &cart(user_id, lines));
            let gateway_order_id = format!("gw_{}", shared::util::new_id());
            open_checkout(manager, user_id, &gateway_order_id);
            OrderCommandPayload::PlaceOrder {
                address: address(),
                payment_method,
                coupon_code: None,
                payment: Some(signed_payment(
                    &gateway_order_id,
                    &format!("pay_{}", shared::util::new_id()),
                )),
            }
        }
        _ => place_payload(payment_method, None),
    };
    place_order_with(manager, user_id, lines, payload)
}

fn get_order(manager: &OrdersManager, order_id: &str) -> Order {
    manager.storage().get_order(order_id).unwrap().unwrap()
}

fn stock_of(manager: &OrdersManager, product_id: &str) -> Option<u32> {
    manager
        .storage()
        .get_product(product_id)
        .unwrap()
        .unwrap()
        .stock
}

fn wallet_balance(manager: &OrdersManager, user_id: &str) -> f64 {
    manager
        .storage()
        .get_wallet(user_id)
        .unwrap()
        .map(|w| w.balance)
        .unwrap_or(0.0)
}

fn coupon(manager: &OrdersManager, name: &str) -> Coupon {
    manager.storage().get_coupon(name).unwrap().unwrap()
}

fn error_code(resp: &CommandResponse) -> CommandErrorCode {
    assert!(!resp.success, "Expected failure, got {:?}", resp);
    resp.error.as_ref().unwrap().code
}

/// `final_amount == max(0, total_order_price - discount + delivery_charge)`
fn assert_final_amount_consistent(order: &Order) {
    let live: f64 = order.live_items().map(|i| i.total_product_price).sum();
    assert!((order.total_order_price - live).abs() < 0.005);
    let expected = (order.total_order_price - order.discount + order.delivery_charge).max(0.0);
    assert!(
        (order.final_amount - expected).abs() < 0.005,
        "final_amount {} != {}",
        order.final_amount,
        expected
    );
}

fn item_ids(order: &Order) -> Vec<String> {
    order.items.iter().map(|i| i.item_id.clone()).collect()
}

fn item_for_product<'a>(order: &'a Order, product_id: &str) -> &'a shared::order::OrderedItem {
    order
        .items
        .iter()
        .find(|i| i.product_id == product_id)
        .unwrap()
}

fn deliver_order(manager: &OrdersManager, order_id: &str) {
    let resp = manager.execute_command(admin_cmd(OrderCommandPayload::UpdateOrderStatus {
        order_id: order_id.to_string(),
        status: OrderStatus::Delivered,
    }));
    assert!(resp.success, "Failed to deliver: {:?}", resp.error);
}
