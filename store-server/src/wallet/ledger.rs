//! Wallet ledger operations
//!
//! The transaction log is append-only; `balance` is a cache of
//! `Σ credits - Σ debits` and must always agree with [`replay`].

use rust_decimal::prelude::*;
use shared::models::{TransactionPurpose, TransactionType, Wallet, WalletTransaction};
use shared::order::{Order, OrderedItem};
use shared::util::new_id;

use super::WalletError;
use crate::orders::money::{MONEY_TOLERANCE, round2, to_decimal, to_f64};

/// References attached to a ledger entry
#[derive(Debug, Clone, Default)]
pub struct Posting {
    pub order_id: Option<String>,
    pub item_id: Option<String>,
    pub payment_id: Option<String>,
}

impl Posting {
    pub fn for_item(order_id: &str, item_id: &str) -> Self {
        Self {
            order_id: Some(order_id.to_string()),
            item_id: Some(item_id.to_string()),
            payment_id: None,
        }
    }

    pub fn for_order(order_id: &str) -> Self {
        Self {
            order_id: Some(order_id.to_string()),
            ..Self::default()
        }
    }

    pub fn for_payment(payment_id: &str) -> Self {
        Self {
            payment_id: Some(payment_id.to_string()),
            ..Self::default()
        }
    }
}

fn require_positive(amount: f64) -> Result<Decimal, WalletError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(WalletError::InvalidAmount(amount));
    }
    Ok(round2(to_decimal(amount)))
}

fn append(
    wallet: &mut Wallet,
    amount: Decimal,
    transaction_type: TransactionType,
    purpose: TransactionPurpose,
    description: String,
    posting: Posting,
    now: i64,
) {
    wallet.transactions.push(WalletTransaction {
        transaction_id: new_id(),
        amount: to_f64(amount),
        transaction_type,
        purpose,
        description,
        order_id: posting.order_id,
        item_id: posting.item_id,
        payment_id: posting.payment_id,
        balance_after: wallet.balance,
        created_at: now,
    });
    wallet.updated_at = now;
}

/// Add money to a wallet
pub fn credit(
    wallet: &mut Wallet,
    amount: f64,
    purpose: TransactionPurpose,
    description: impl Into<String>,
    posting: Posting,
    now: i64,
) -> Result<(), WalletError> {
    let amount = require_positive(amount)?;

    wallet.balance = to_f64(to_decimal(wallet.balance) + amount);
    if purpose.is_refund() {
        wallet.refund_amount = to_f64(to_decimal(wallet.refund_amount) + amount);
    }
    append(
        wallet,
        amount,
        TransactionType::Credit,
        purpose,
        description.into(),
        posting,
        now,
    );
    Ok(())
}

/// Take money from a wallet
pub fn debit(
    wallet: &mut Wallet,
    amount: f64,
    purpose: TransactionPurpose,
    description: impl Into<String>,
    posting: Posting,
    now: i64,
) -> Result<(), WalletError> {
    let amount = require_positive(amount)?;
    let balance = to_decimal(wallet.balance);
    if balance < amount {
        return Err(WalletError::InsufficientBalance {
            required: to_f64(amount),
            available: wallet.balance,
        });
    }

    wallet.balance = to_f64(balance - amount);
    wallet.total_debited = to_f64(to_decimal(wallet.total_debited) + amount);
    append(
        wallet,
        amount,
        TransactionType::Debit,
        purpose,
        description.into(),
        posting,
        now,
    );
    Ok(())
}

/// Amount refunded for one line of an order
///
/// Lines of a coupon order give back their value minus their share of the
/// coupon discount, weighted over every line of the order (cancelled ones
/// included, so earlier cancellations don't shift later shares).
pub fn refund_for_item(order: &Order, item: &OrderedItem) -> f64 {
    let item_total = to_decimal(item.price) * Decimal::from(item.quantity);

    if order.coupon_applied && order.discount > 0.0 {
        let order_total: Decimal = order
            .items
            .iter()
            .map(|i| to_decimal(i.price) * Decimal::from(i.quantity))
            .sum();
        if order_total > Decimal::ZERO {
            let share = to_decimal(order.discount) * item_total / order_total;
            return to_f64((item_total - share).max(Decimal::ZERO));
        }
    }

    to_f64(item_total)
}

/// Credit the refund for one line, at most once per (order, item)
///
/// Returns the amount credited; a zero-value line settles without a ledger entry.
pub fn settle_refund(
    wallet: &mut Wallet,
    order: &Order,
    item: &OrderedItem,
    purpose: TransactionPurpose,
    now: i64,
) -> Result<f64, WalletError> {
    if wallet.refund_for(&order.order_id, &item.item_id).is_some() {
        return Err(WalletError::RefundAlreadyIssued {
            order_id: order.order_id.clone(),
            item_id: item.item_id.clone(),
        });
    }

    let amount = refund_for_item(order, item);
    if amount <= 0.0 {
        return Ok(0.0);
    }

    let description = match purpose {
        TransactionPurpose::Return => format!("Refund for returned {}", item.product_name),
        _ => format!("Refund for cancelled {}", item.product_name),
    };
    credit(
        wallet,
        amount,
        purpose,
        description,
        Posting::for_item(&order.order_id, &item.item_id),
        now,
    )?;

    tracing::info!(
        user_id = %wallet.user_id,
        order_id = %order.order_id,
        item_id = %item.item_id,
        amount,
        "Refund credited to wallet"
    );
    Ok(amount)
}

/// Balance implied by a transaction log
pub fn replay(transactions: &[WalletTransaction]) -> f64 {
    let balance: Decimal = transactions
        .iter()
        .map(|t| match t.transaction_type {
            TransactionType::Credit => to_decimal(t.amount),
            TransactionType::Debit => -to_decimal(t.amount),
        })
        .sum();
    to_f64(balance)
}

/// Whether the cached balance agrees with the log
pub fn is_reconciled(wallet: &Wallet) -> bool {
    (to_decimal(replay(&wallet.transactions)) - to_decimal(wallet.balance)).abs() < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ShippingAddress;
    use shared::order::{OrderStatus, PaymentMethod};

    fn item(item_id: &str, price: f64, quantity: u32) -> OrderedItem {
        OrderedItem {
            item_id: item_id.to_string(),
            product_id: format!("p-{}", item_id),
            product_name: format!("Product {}", item_id),
            product_images: vec![],
            regular_price: price,
            quantity,
            price,
            total_product_price: price * quantity as f64,
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
        }
    }

    fn order(items: Vec<OrderedItem>, discount: f64) -> Order {
        let total: f64 = items.iter().map(|i| i.total_product_price).sum();
        Order {
            order_id: "o-1".to_string(),
            user_id: "u-1".to_string(),
            items,
            total_order_price: total,
            discount,
            delivery_charge: 0.0,
            final_amount: total - discount,
            shipping_address: ShippingAddress::default(),
            payment_method: PaymentMethod::Online,
            payment: None,
            status: OrderStatus::Pending,
            coupon_name: (discount > 0.0).then(|| "SAVE".to_string()),
            coupon_applied: discount > 0.0,
            cancel_reason: None,
            created_on: 0,
            updated_on: 0,
            delivered_on: None,
            invoice_date: None,
            version: 0,
        }
    }

    #[test]
    fn test_credit_and_debit_keep_log_in_step() {
        let mut wallet = Wallet::new("u-1", 0);
        credit(&mut wallet, 500.0, TransactionPurpose::Add, "Top up", Posting::for_payment("pay-1"), 1).unwrap();
        debit(&mut wallet, 120.5, TransactionPurpose::Purchase, "Order", Posting::for_order("o-1"), 2).unwrap();

        assert_eq!(wallet.balance, 379.5);
        assert_eq!(wallet.total_debited, 120.5);
        assert_eq!(wallet.refund_amount, 0.0);
        assert_eq!(wallet.transactions.len(), 2);
        assert_eq!(wallet.transactions[1].balance_after, 379.5);
        assert!(is_reconciled(&wallet));
    }

    #[test]
    fn test_debit_rejects_overdraft() {
        let mut wallet = Wallet::new("u-1", 0);
        credit(&mut wallet, 50.0, TransactionPurpose::Add, "Top up", Posting::default(), 1).unwrap();

        let err = debit(&mut wallet, 50.01, TransactionPurpose::Purchase, "Order", Posting::default(), 2)
            .unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientBalance {
                required: 50.01,
                available: 50.0,
            }
        );
        assert_eq!(wallet.balance, 50.0);
        assert_eq!(wallet.transactions.len(), 1);
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let mut wallet = Wallet::new("u-1", 0);
        assert!(credit(&mut wallet, 0.0, TransactionPurpose::Add, "x", Posting::default(), 1).is_err());
        assert!(credit(&mut wallet, -5.0, TransactionPurpose::Add, "x", Posting::default(), 1).is_err());
        assert!(debit(&mut wallet, f64::NAN, TransactionPurpose::Purchase, "x", Posting::default(), 1).is_err());
        assert!(wallet.transactions.is_empty());
    }

    #[test]
    fn test_refund_without_coupon_is_line_value() {
        let o = order(vec![item("a", 200.0, 2), item("b", 100.0, 1)], 0.0);
        assert_eq!(refund_for_item(&o, &o.items[0]), 400.0);
    }

    #[test]
    fn test_refund_with_coupon_is_proportional() {
        // discount 50 over 500 of goods: line a carries 40, line b carries 10
        let o = order(vec![item("a", 200.0, 2), item("b", 100.0, 1)], 50.0);
        assert_eq!(refund_for_item(&o, &o.items[0]), 360.0);
        assert_eq!(refund_for_item(&o, &o.items[1]), 90.0);
    }

    #[test]
    fn test_refund_share_rounds_to_cents() {
        let o = order(vec![item("a", 100.0, 1), item("b", 100.0, 1), item("c", 100.0, 1)], 10.0);
        assert_eq!(refund_for_item(&o, &o.items[0]), 96.67);
    }

    #[test]
    fn test_settle_refund_once_per_item() {
        let o = order(vec![item("a", 200.0, 2)], 0.0);
        let mut wallet = Wallet::new("u-1", 0);

        let amount = settle_refund(&mut wallet, &o, &o.items[0], TransactionPurpose::Refund, 1).unwrap();
        assert_eq!(amount, 400.0);
        assert_eq!(wallet.balance, 400.0);
        assert_eq!(wallet.refund_amount, 400.0);

        let err = settle_refund(&mut wallet, &o, &o.items[0], TransactionPurpose::Return, 2).unwrap_err();
        assert!(matches!(err, WalletError::RefundAlreadyIssued { .. }));
        assert_eq!(wallet.balance, 400.0);
    }

    #[test]
    fn test_replay_detects_drift() {
        let mut wallet = Wallet::new("u-1", 0);
        credit(&mut wallet, 10.0, TransactionPurpose::Add, "Top up", Posting::default(), 1).unwrap();
        assert_eq!(replay(&wallet.transactions), 10.0);

        wallet.balance = 11.0;
        assert!(!is_reconciled(&wallet));
    }
}
