//! Gateway Payment Model
//!
//! The server opens a gateway order for a known amount before the customer
//! pays. The confirmation that comes back is settled against that record, so
//! the amount credited or charged is always the one the server asked for.

use serde::{Deserialize, Serialize};

/// What a gateway order pays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    WalletTopUp,
    Checkout,
}

/// Amount the gateway was asked to collect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub gateway_order_id: String,
    pub user_id: String,
    pub purpose: PaymentPurpose,
    pub amount: f64,
    pub currency: String,
    pub created_at: i64,
    /// Payment that settled this gateway order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<i64>,
}

impl GatewayOrder {
    pub fn is_settled(&self) -> bool {
        self.payment_id.is_some()
    }
}

/// Settled gateway payment, keyed by payment id across all users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledPayment {
    pub payment_id: String,
    pub gateway_order_id: String,
    pub user_id: String,
    pub purpose: PaymentPurpose,
    pub amount: f64,
    pub settled_at: i64,
    /// Order paid for, when the purpose is checkout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Open a wallet top-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopUpRequest {
    pub amount: f64,
}

/// Open a checkout payment for the current cart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutPaymentRequest {
    #[serde(default)]
    pub coupon_code: Option<String>,
}
