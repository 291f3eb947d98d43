//! Order commands
//!
//! Every mutation of an order goes through an [`OrderCommand`]. The command id
//! makes retries idempotent; `expected_version` lets a caller refuse to act on
//! an order that changed since it was read.

use serde::{Deserialize, Serialize};

use super::types::{GatewayPayment, OrderStatus, PaymentMethod, ReturnDecision};
use crate::models::ShippingAddress;

/// Authenticated caller, supplied by the upstream auth layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    Customer { user_id: String },
    Admin { admin_id: String },
}

impl Actor {
    pub fn customer(user_id: impl Into<String>) -> Self {
        Self::Customer {
            user_id: user_id.into(),
        }
    }

    pub fn admin(admin_id: impl Into<String>) -> Self {
        Self::Admin {
            admin_id: admin_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Customer { user_id } => user_id,
            Self::Admin { admin_id } => admin_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// Whether this caller may act on an order owned by `owner`
    pub fn can_access(&self, owner: &str) -> bool {
        match self {
            Self::Customer { user_id } => user_id == owner,
            Self::Admin { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    pub command_id: String,
    pub actor: Actor,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(actor: Actor, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: crate::util::new_id(),
            actor,
            timestamp: crate::util::now_millis(),
            expected_version: None,
            payload,
        }
    }

    pub fn with_command_id(mut self, command_id: impl Into<String>) -> Self {
        self.command_id = command_id.into();
        self
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Turn the caller's cart into an order
    PlaceOrder {
        address: ShippingAddress,
        payment_method: PaymentMethod,
        #[serde(default)]
        coupon_code: Option<String>,
        /// Required for online payments
        #[serde(default)]
        payment: Option<GatewayPayment>,
    },
    CancelItem {
        order_id: String,
        item_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    CancelOrder {
        order_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    UpdateItemStatus {
        order_id: String,
        item_id: String,
        status: OrderStatus,
    },
    UpdateOrderStatus {
        order_id: String,
        status: OrderStatus,
    },
    RequestReturn {
        order_id: String,
        item_id: String,
        reason: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        images: Vec<String>,
    },
    CancelReturn {
        order_id: String,
        item_id: String,
    },
    ReviewReturn {
        order_id: String,
        item_id: String,
        #[serde(flatten)]
        decision: ReturnDecision,
    },
    UpdateReturnStatus {
        order_id: String,
        item_id: String,
        status: OrderStatus,
    },
    RestockItem {
        order_id: String,
        item_id: String,
    },
}

impl OrderCommandPayload {
    /// Order targeted by the command (none for placement)
    pub fn order_id(&self) -> Option<&str> {
        match self {
            Self::PlaceOrder { .. } => None,
            Self::CancelItem { order_id, .. }
            | Self::CancelOrder { order_id, .. }
            | Self::UpdateItemStatus { order_id, .. }
            | Self::UpdateOrderStatus { order_id, .. }
            | Self::RequestReturn { order_id, .. }
            | Self::CancelReturn { order_id, .. }
            | Self::ReviewReturn { order_id, .. }
            | Self::UpdateReturnStatus { order_id, .. }
            | Self::RestockItem { order_id, .. } => Some(order_id),
        }
    }

    /// Back-office commands
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::CancelOrder { .. }
                | Self::UpdateItemStatus { .. }
                | Self::UpdateOrderStatus { .. }
                | Self::ReviewReturn { .. }
                | Self::UpdateReturnStatus { .. }
                | Self::RestockItem { .. }
        )
    }

    /// Commands only the order owner issues
    pub fn requires_customer(&self) -> bool {
        matches!(
            self,
            Self::PlaceOrder { .. } | Self::RequestReturn { .. } | Self::CancelReturn { .. }
        )
    }
}
