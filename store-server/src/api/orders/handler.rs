//! Order API Handlers

use axum::{
    Json,
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};
use shared::models::{CheckoutPaymentRequest, GatewayOrder, ShippingAddress};
use shared::order::{
    Actor, CommandResponse, GatewayPayment, Order, OrderCommand, OrderCommandPayload, OrderStatus,
    PaymentMethod, ReturnDecision,
};
use shared::util::now_millis;

use crate::auth::{CurrentActor, CurrentAdmin, CurrentCustomer};
use crate::core::ServerState;
use crate::utils::{ApiResult, AppError, ok, ok_with_message};

const IDEMPOTENCY_KEY: &str = "idempotency-key";

/// Command id and optimistic version taken from request headers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandMeta {
    pub command_id: Option<String>,
    pub expected_version: Option<u64>,
}

impl<S: Send + Sync> FromRequestParts<S> for CommandMeta {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(|v| v.trim().trim_matches('"').to_string())
                .filter(|v| !v.is_empty())
        };

        let expected_version = match header_str(header::IF_MATCH.as_str()) {
            Some(v) => Some(v.parse::<u64>().map_err(|_| {
                AppError::invalid_request(format!("If-Match must be an order version, got {}", v))
            })?),
            None => None,
        };

        Ok(Self {
            command_id: header_str(IDEMPOTENCY_KEY),
            expected_version,
        })
    }
}

/// Successful command outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandAccepted {
    pub command_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_amount: Option<f64>,
    /// The command id was already processed; nothing changed
    pub duplicate: bool,
}

impl From<CommandResponse> for CommandAccepted {
    fn from(response: CommandResponse) -> Self {
        Self {
            duplicate: response.order_id.is_none(),
            command_id: response.command_id,
            order_id: response.order_id,
            refunded_amount: response.refunded_amount,
        }
    }
}

fn execute(
    state: &ServerState,
    actor: Actor,
    meta: CommandMeta,
    payload: OrderCommandPayload,
    message: &str,
) -> ApiResult<CommandAccepted> {
    let mut cmd = OrderCommand::new(actor, payload);
    if let Some(command_id) = meta.command_id {
        cmd = cmd.with_command_id(command_id);
    }
    if let Some(version) = meta.expected_version {
        cmd = cmd.with_expected_version(version);
    }

    let mut response = state.orders.execute_command(cmd);
    if let Some(error) = response.error.take() {
        return Err(error.into());
    }
    Ok(ok_with_message(CommandAccepted::from(response), message))
}

// =========================================================================
// Reads
// =========================================================================

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
}

/// Own orders for customers, every order for admins; newest first
pub async fn list(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<OrderList> {
    let orders = state.orders.list_orders_for(&actor)?;
    Ok(ok(OrderList { orders }))
}

pub async fn admin_list(
    State(state): State<ServerState>,
    admin: CurrentAdmin,
) -> ApiResult<OrderList> {
    let orders = state.orders.list_orders_for(&admin.actor())?;
    Ok(ok(OrderList { orders }))
}

/// Another customer's order reads as not found
pub async fn get_by_id(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<String>,
) -> ApiResult<Order> {
    let order = state.orders.get_order_for(&order_id, &actor)?;
    Ok(ok(order))
}

// =========================================================================
// Customer commands
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Gateway confirmation, required for online payments
    #[serde(default)]
    pub payment: Option<GatewayPayment>,
}

pub async fn place(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    meta: CommandMeta,
    Json(req): Json<PlaceOrderRequest>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::PlaceOrder {
        address: req.address,
        payment_method: req.payment_method,
        coupon_code: req.coupon_code,
        payment: req.payment,
    };
    execute(&state, customer.actor(), meta, payload, "Order placed")
}

/// Gateway order for paying the current cart online
pub async fn open_payment(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Json(req): Json<CheckoutPaymentRequest>,
) -> ApiResult<GatewayOrder> {
    let opened = state
        .cart
        .open_checkout_payment(customer.user_id(), &req, now_millis())?;
    Ok(ok(opened))
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Owner or admin cancels one line
pub async fn cancel_item(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    meta: CommandMeta,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(req): Json<CancelRequest>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::CancelItem {
        order_id,
        item_id,
        reason: req.reason,
    };
    execute(&state, actor, meta, payload, "Item cancelled")
}

#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub reason: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

pub async fn request_return(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    meta: CommandMeta,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(req): Json<ReturnRequest>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::RequestReturn {
        order_id,
        item_id,
        reason: req.reason,
        description: req.description,
        images: req.images,
    };
    execute(&state, customer.actor(), meta, payload, "Return requested")
}

pub async fn cancel_return(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    meta: CommandMeta,
    Path((order_id, item_id)): Path<(String, String)>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::CancelReturn { order_id, item_id };
    execute(&state, customer.actor(), meta, payload, "Return request withdrawn")
}

// =========================================================================
// Admin commands
// =========================================================================

pub async fn cancel_order(
    State(state): State<ServerState>,
    admin: CurrentAdmin,
    meta: CommandMeta,
    Path(order_id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::CancelOrder {
        order_id,
        reason: req.reason,
    };
    execute(&state, admin.actor(), meta, payload, "Order cancelled")
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

pub async fn update_order_status(
    State(state): State<ServerState>,
    admin: CurrentAdmin,
    meta: CommandMeta,
    Path(order_id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::UpdateOrderStatus {
        order_id,
        status: req.status,
    };
    execute(&state, admin.actor(), meta, payload, "Order status updated")
}

pub async fn update_item_status(
    State(state): State<ServerState>,
    admin: CurrentAdmin,
    meta: CommandMeta,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::UpdateItemStatus {
        order_id,
        item_id,
        status: req.status,
    };
    execute(&state, admin.actor(), meta, payload, "Item status updated")
}

/// Body: `{"decision":"approve"}` or `{"decision":"reject","category":..,"reason":..}`
pub async fn review_return(
    State(state): State<ServerState>,
    admin: CurrentAdmin,
    meta: CommandMeta,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(decision): Json<ReturnDecision>,
) -> ApiResult<CommandAccepted> {
    let message = match decision {
        ReturnDecision::Approve => "Return approved",
        ReturnDecision::Reject { .. } => "Return rejected",
    };
    let payload = OrderCommandPayload::ReviewReturn {
        order_id,
        item_id,
        decision,
    };
    execute(&state, admin.actor(), meta, payload, message)
}

pub async fn update_return_status(
    State(state): State<ServerState>,
    admin: CurrentAdmin,
    meta: CommandMeta,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::UpdateReturnStatus {
        order_id,
        item_id,
        status: req.status,
    };
    execute(&state, admin.actor(), meta, payload, "Return status updated")
}

pub async fn restock_item(
    State(state): State<ServerState>,
    admin: CurrentAdmin,
    meta: CommandMeta,
    Path((order_id, item_id)): Path<(String, String)>,
) -> ApiResult<CommandAccepted> {
    let payload = OrderCommandPayload::RestockItem { order_id, item_id };
    execute(&state, admin.actor(), meta, payload, "Item restocked")
}
