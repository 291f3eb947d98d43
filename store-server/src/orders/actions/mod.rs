//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use shared::models::TransactionPurpose;
use shared::order::{
    Order, OrderCommand, OrderCommandPayload, OrderStatus, PaymentMethod, PaymentReference,
};

use crate::orders::reducer::transition_item;
use crate::orders::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError, OrderPolicy,
};
use crate::stock;
use crate::wallet;

mod cancel_item;
mod cancel_order;
mod cancel_return;
mod place_order;
mod request_return;
mod restock_item;
mod review_return;
mod update_item_status;
mod update_order_status;
mod update_return_status;

pub use cancel_item::CancelItemAction;
pub use cancel_order::CancelOrderAction;
pub use cancel_return::CancelReturnAction;
pub use place_order::PlaceOrderAction;
pub use request_return::RequestReturnAction;
pub use restock_item::RestockItemAction;
pub use review_return::ReviewReturnAction;
pub use update_item_status::UpdateItemStatusAction;
pub use update_order_status::UpdateOrderStatusAction;
pub use update_return_status::UpdateReturnStatusAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    PlaceOrder(PlaceOrderAction),
    CancelItem(CancelItemAction),
    CancelOrder(CancelOrderAction),
    UpdateItemStatus(UpdateItemStatusAction),
    UpdateOrderStatus(UpdateOrderStatusAction),
    RequestReturn(RequestReturnAction),
    CancelReturn(CancelReturnAction),
    ReviewReturn(ReviewReturnAction),
    UpdateReturnStatus(UpdateReturnStatusAction),
    RestockItem(RestockItemAction),
}

impl CommandHandler for CommandAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        match self {
            CommandAction::PlaceOrder(action) => action.execute(ctx, metadata),
            CommandAction::CancelItem(action) => action.execute(ctx, metadata),
            CommandAction::CancelOrder(action) => action.execute(ctx, metadata),
            CommandAction::UpdateItemStatus(action) => action.execute(ctx, metadata),
            CommandAction::UpdateOrderStatus(action) => action.execute(ctx, metadata),
            CommandAction::RequestReturn(action) => action.execute(ctx, metadata),
            CommandAction::CancelReturn(action) => action.execute(ctx, metadata),
            CommandAction::ReviewReturn(action) => action.execute(ctx, metadata),
            CommandAction::UpdateReturnStatus(action) => action.execute(ctx, metadata),
            CommandAction::RestockItem(action) => action.execute(ctx, metadata),
        }
    }
}

impl CommandAction {
    /// Convert an OrderCommand to its action
    ///
    /// This is the ONLY place with a match on OrderCommandPayload.
    pub fn from_command(cmd: &OrderCommand, policy: &OrderPolicy) -> Self {
        match &cmd.payload {
            OrderCommandPayload::PlaceOrder {
                address,
                payment_method,
                coupon_code,
                payment,
            } => CommandAction::PlaceOrder(PlaceOrderAction {
                address: address.clone(),
                payment_method: *payment_method,
                coupon_code: coupon_code.clone(),
                payment: payment
                    .as_ref()
                    .filter(|_| *payment_method == PaymentMethod::Online)
                    .map(|p| PaymentReference {
                        gateway_order_id: p.gateway_order_id.clone(),
                        payment_id: p.payment_id.clone(),
                    }),
                pricing: policy.pricing,
            }),
            OrderCommandPayload::CancelItem {
                order_id,
                item_id,
                reason,
            } => CommandAction::CancelItem(CancelItemAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                reason: reason.clone(),
            }),
            OrderCommandPayload::CancelOrder { order_id, reason } => {
                CommandAction::CancelOrder(CancelOrderAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::UpdateItemStatus {
                order_id,
                item_id,
                status,
            } => CommandAction::UpdateItemStatus(UpdateItemStatusAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                status: *status,
            }),
            OrderCommandPayload::UpdateOrderStatus { order_id, status } => {
                CommandAction::UpdateOrderStatus(UpdateOrderStatusAction {
                    order_id: order_id.clone(),
                    status: *status,
                })
            }
            OrderCommandPayload::RequestReturn {
                order_id,
                item_id,
                reason,
                description,
                images,
            } => CommandAction::RequestReturn(RequestReturnAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                reason: reason.clone(),
                description: description.clone(),
                images: images.clone(),
                return_window_days: policy.return_window_days,
            }),
            OrderCommandPayload::CancelReturn { order_id, item_id } => {
                CommandAction::CancelReturn(CancelReturnAction {
                    order_id: order_id.clone(),
                    item_id: item_id.clone(),
                })
            }
            OrderCommandPayload::ReviewReturn {
                order_id,
                item_id,
                decision,
            } => CommandAction::ReviewReturn(ReviewReturnAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                decision: decision.clone(),
            }),
            OrderCommandPayload::UpdateReturnStatus {
                order_id,
                item_id,
                status,
            } => CommandAction::UpdateReturnStatus(UpdateReturnStatusAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                status: *status,
            }),
            OrderCommandPayload::RestockItem { order_id, item_id } => {
                CommandAction::RestockItem(RestockItemAction {
                    order_id: order_id.clone(),
                    item_id: item_id.clone(),
                })
            }
        }
    }
}

// ========== Shared line operations ==========

/// Cancel one line and put its units back on the shelf
///
/// The line is marked `restocked` once its units are released, so a return
/// that was approved before the cancellation cannot be restocked again.
/// Totals and status are left for the caller to recompute.
pub(super) fn cancel_line(
    ctx: &mut CommandContext<'_>,
    order: &mut Order,
    item_id: &str,
    reason: &str,
    now: i64,
) -> Result<(), OrderError> {
    let item = order
        .find_item_mut(item_id)
        .ok_or_else(|| OrderError::ItemNotFound(item_id.to_string()))?;
    transition_item(item, OrderStatus::Cancelled, now)?;
    item.cancel_reason = Some(reason.to_string());
    item.cancelled_at = Some(now);

    let (product_id, quantity) = (item.product_id.clone(), item.quantity);
    match ctx.find_product(&product_id)? {
        Some(mut product) => {
            stock::release(&mut product, quantity);
            ctx.save_product(product);
            if let Some(item) = order.find_item_mut(item_id) {
                item.restocked = true;
            }
        }
        None => {
            tracing::warn!(
                order_id = %order.order_id,
                item_id,
                product_id = %product_id,
                "Product no longer exists, stock not released"
            );
        }
    }
    Ok(())
}

/// Credit the refund for one line to the order owner's wallet
///
/// Records the settled amount on the line and returns it.
pub(super) fn refund_line(
    ctx: &mut CommandContext<'_>,
    order: &mut Order,
    item_id: &str,
    purpose: TransactionPurpose,
    now: i64,
) -> Result<f64, OrderError> {
    let item = order
        .find_item(item_id)
        .cloned()
        .ok_or_else(|| OrderError::ItemNotFound(item_id.to_string()))?;

    let mut wallet = ctx.load_wallet(&order.user_id, now)?;
    let amount = wallet::settle_refund(&mut wallet, order, &item, purpose, now)?;
    if amount > 0.0 {
        ctx.save_wallet(wallet);
        if let Some(line) = order.find_item_mut(item_id) {
            line.refunded_amount = Some(amount);
        }
    }
    Ok(amount)
}
