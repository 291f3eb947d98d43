//! Persisted order document

use serde::{Deserialize, Serialize};

use super::types::{OrderStatus, PaymentMethod, PaymentReference, RequestStatus};
use crate::models::ShippingAddress;

/// One product line of an order
///
/// Product name, images and regular price are copied at order time so the
/// line survives later catalog edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub item_id: String,
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_images: Vec<String>,
    /// Regular unit price before any discount
    pub regular_price: f64,
    pub quantity: u32,
    /// Discounted unit price actually charged
    pub price: f64,
    /// `price * quantity`
    pub total_product_price: f64,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_status: Option<RequestStatus>,

    // Cancellation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,

    // Return workflow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_description: Option<String>,
    #[serde(default)]
    pub return_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_requested_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_on: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<i64>,
    /// Wallet credit settled for this line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refunded_amount: Option<f64>,
    /// Stock already credited back after an approved return
    #[serde(default)]
    pub restocked: bool,
}

impl OrderedItem {
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    /// Drop any return request data
    pub fn clear_return_request(&mut self) {
        self.request_status = None;
        self.return_reason = None;
        self.return_description = None;
        self.return_images.clear();
        self.return_requested_at = None;
    }
}

/// Order document
///
/// Invariant: `final_amount == max(0, total_order_price - discount + delivery_charge)`,
/// where `total_order_price` sums the non-cancelled lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<OrderedItem>,
    pub total_order_price: f64,
    /// Coupon discount applied to the whole order
    pub discount: f64,
    pub delivery_charge: f64,
    pub final_amount: f64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentReference>,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_name: Option<String>,
    #[serde(default)]
    pub coupon_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    pub created_on: i64,
    pub updated_on: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<i64>,
    /// Incremented on every committed change
    #[serde(default)]
    pub version: u64,
}

impl Order {
    pub fn find_item(&self, item_id: &str) -> Option<&OrderedItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut OrderedItem> {
        self.items.iter_mut().find(|i| i.item_id == item_id)
    }

    /// Lines that still count toward totals and status
    pub fn live_items(&self) -> impl Iterator<Item = &OrderedItem> {
        self.items.iter().filter(|i| !i.is_cancelled())
    }
}
