//! CancelOrder command handler
//!
//! Admin cancellation of every remaining line. Lines that already finished a
//! return stay `returned` (they were refunded by the return); every other live
//! line is cancelled, including delivered lines and lines mid-return.

use rust_decimal::Decimal;
use shared::models::TransactionPurpose;
use shared::order::OrderStatus;

use super::{cancel_line, refund_line};
use crate::orders::money::{to_decimal, to_f64};
use crate::orders::reducer::refresh_aggregates;
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};

const DEFAULT_REASON: &str = "Cancelled by admin";

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub reason: Option<String>,
}

impl CommandHandler for CancelOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        let now = metadata.timestamp;
        let mut order = ctx.load_order(&self.order_id)?;

        if order.status == OrderStatus::Cancelled || order.live_items().next().is_none() {
            return Err(OrderError::OrderAlreadyCancelled(self.order_id.clone()));
        }
        let live_ids: Vec<String> = order
            .live_items()
            .filter(|i| i.status.is_cancellable())
            .map(|i| i.item_id.clone())
            .collect();
        if live_ids.is_empty() {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        let reason = self
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REASON)
            .to_string();

        for item_id in &live_ids {
            cancel_line(ctx, &mut order, item_id, &reason, now)?;
        }

        let mut refunded = Decimal::ZERO;
        if order.payment_method.is_prepaid() {
            for item_id in &live_ids {
                refunded += to_decimal(refund_line(
                    ctx,
                    &mut order,
                    item_id,
                    TransactionPurpose::Refund,
                    now,
                )?);
            }
        }

        refresh_aggregates(&mut order);
        order.cancel_reason = Some(reason);

        tracing::debug!(
            order_id = %self.order_id,
            lines = live_ids.len(),
            "Order cancelled"
        );
        ctx.save_order(order);

        Ok(ActionOutcome::new(&self.order_id).with_refund(to_f64(refunded)))
    }
}
