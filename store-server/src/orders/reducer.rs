//! Order aggregate derivation
//!
//! Order status and totals are never edited directly: after every item change
//! the action calls [`recompute_order_totals`] and [`recompute_order_status`].

use rust_decimal::prelude::*;
use shared::order::{Order, OrderStatus, OrderedItem};

use super::money::{to_decimal, to_f64};
use super::traits::OrderError;

/// Move one item along the status graph
///
/// Stamps `updated_on`, and `delivered_on` when the item reaches delivered.
pub fn transition_item(item: &mut OrderedItem, to: OrderStatus, now: i64) -> Result<(), OrderError> {
    if item.is_cancelled() {
        return Err(OrderError::ItemAlreadyCancelled(item.item_id.clone()));
    }
    if !item.status.can_transition_to(to) {
        return Err(OrderError::InvalidTransition {
            from: item.status,
            to,
        });
    }

    item.status = to;
    item.updated_on = Some(now);
    if to == OrderStatus::Delivered && item.delivered_on.is_none() {
        item.delivered_on = Some(now);
    }
    Ok(())
}

/// Derive the order status from its items
///
/// - every item cancelled: cancelled
/// - any item mid-return: return_requested
/// - every live item on one status (returned counted as delivered): that status
/// - otherwise the current status, pulled back to delivered if it still
///   claims a return that no item is in
pub fn recompute_order_status(items: &[OrderedItem], current: OrderStatus) -> OrderStatus {
    if items.is_empty() {
        return current;
    }

    let live: Vec<OrderStatus> = items
        .iter()
        .filter(|i| !i.is_cancelled())
        .map(|i| i.status)
        .collect();

    if live.is_empty() {
        return OrderStatus::Cancelled;
    }
    if live.iter().any(|s| s.is_in_return_flow()) {
        return OrderStatus::ReturnRequested;
    }
    let normalize = |s: OrderStatus| match s {
        OrderStatus::Returned => OrderStatus::Delivered,
        other => other,
    };
    let first = normalize(live[0]);
    if live.iter().all(|s| normalize(*s) == first) {
        return first;
    }

    if current.is_in_return_flow() || current == OrderStatus::Cancelled {
        OrderStatus::Delivered
    } else {
        current
    }
}

/// Recompute `total_order_price` and `final_amount` from the live items
///
/// `final_amount = max(0, total_order_price - discount + delivery_charge)`.
pub fn recompute_order_totals(order: &mut Order) {
    let total: Decimal = order
        .live_items()
        .map(|i| to_decimal(i.total_product_price))
        .sum();
    let final_amount =
        (total - to_decimal(order.discount) + to_decimal(order.delivery_charge)).max(Decimal::ZERO);

    order.total_order_price = to_f64(total);
    order.final_amount = to_f64(final_amount);
}

/// Recompute totals and status in one go
pub fn refresh_aggregates(order: &mut Order) {
    recompute_order_totals(order);
    order.status = recompute_order_status(&order.items, order.status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ShippingAddress;
    use shared::order::PaymentMethod;
    use OrderStatus::*;

    fn item(item_id: &str, status: OrderStatus, total: f64) -> OrderedItem {
        OrderedItem {
            item_id: item_id.to_string(),
            product_id: "p-1".to_string(),
            product_name: "Vase".to_string(),
            product_images: vec![],
            regular_price: total,
            quantity: 1,
            price: total,
            total_product_price: total,
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

    fn order(items: Vec<OrderedItem>, discount: f64, delivery: f64) -> Order {
        Order {
            order_id: "o-1".to_string(),
            user_id: "u-1".to_string(),
            items,
            total_order_price: 0.0,
            discount,
            delivery_charge: delivery,
            final_amount: 0.0,
            shipping_address: ShippingAddress::default(),
            payment_method: PaymentMethod::Cod,
            payment: None,
            status: Pending,
            coupon_name: None,
            coupon_applied: false,
            cancel_reason: None,
            created_on: 0,
            updated_on: 0,
            delivered_on: None,
            invoice_date: None,
            version: 0,
        }
    }

    fn status_of(statuses: &[OrderStatus], current: OrderStatus) -> OrderStatus {
        let items: Vec<OrderedItem> = statuses
            .iter()
            .enumerate()
            .map(|(n, s)| item(&n.to_string(), *s, 10.0))
            .collect();
        recompute_order_status(&items, current)
    }

    #[test]
    fn test_status_all_cancelled() {
        assert_eq!(status_of(&[Cancelled, Cancelled], Pending), Cancelled);
    }

    #[test]
    fn test_status_any_return_dominates() {
        assert_eq!(status_of(&[Delivered, ReturnRequested], Delivered), ReturnRequested);
        assert_eq!(status_of(&[Returning, Returned], Delivered), ReturnRequested);
    }

    #[test]
    fn test_status_uniform_live_items() {
        assert_eq!(status_of(&[Shipped, Cancelled, Shipped], Confirmed), Shipped);
        assert_eq!(status_of(&[Delivered, Returned], ReturnRequested), Delivered);
        assert_eq!(status_of(&[Returned, Cancelled], ReturnRequested), Delivered);
    }

    #[test]
    fn test_completed_return_reverts_order_to_delivered() {
        assert_eq!(status_of(&[Returned], ReturnRequested), Delivered);
        assert_eq!(status_of(&[Returned, Returned], ReturnRequested), Delivered);
        assert_eq!(status_of(&[Returned, Returning], ReturnRequested), ReturnRequested);
    }

    #[test]
    fn test_status_mixed_keeps_current() {
        assert_eq!(status_of(&[Pending, Shipped], Confirmed), Confirmed);
        assert_eq!(status_of(&[Pending, Delivered], ReturnRequested), Delivered);
    }

    #[test]
    fn test_totals_exclude_cancelled_lines() {
        let mut o = order(
            vec![item("a", Pending, 400.0), item("b", Cancelled, 100.0)],
            50.0,
            40.0,
        );
        recompute_order_totals(&mut o);
        assert_eq!(o.total_order_price, 400.0);
        assert_eq!(o.final_amount, 390.0);
    }

    #[test]
    fn test_final_amount_never_negative() {
        let mut o = order(vec![item("a", Cancelled, 100.0)], 80.0, 0.0);
        recompute_order_totals(&mut o);
        assert_eq!(o.total_order_price, 0.0);
        assert_eq!(o.final_amount, 0.0);
    }

    #[test]
    fn test_transition_item() {
        let mut i = item("a", Shipped, 10.0);
        transition_item(&mut i, Delivered, 99).unwrap();
        assert_eq!(i.status, Delivered);
        assert_eq!(i.delivered_on, Some(99));
        assert_eq!(i.updated_on, Some(99));

        let err = transition_item(&mut i, Shipped, 100).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { from: Delivered, to: Shipped }));

        let mut c = item("b", Cancelled, 10.0);
        assert!(matches!(
            transition_item(&mut c, Confirmed, 100),
            Err(OrderError::ItemAlreadyCancelled(_))
        ));
    }
}
