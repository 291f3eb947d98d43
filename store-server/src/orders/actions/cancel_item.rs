//! CancelItem command handler
//!
//! Cancels one line of an order. Prepaid orders (online or wallet) get the
//! line's value back in the wallet.

use shared::models::TransactionPurpose;
use shared::order::OrderStatus;

use super::{cancel_line, refund_line};
use crate::orders::reducer::refresh_aggregates;
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};

/// CancelItem action
#[derive(Debug, Clone)]
pub struct CancelItemAction {
    pub order_id: String,
    pub item_id: String,
    pub reason: Option<String>,
}

impl CommandHandler for CancelItemAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        let now = metadata.timestamp;
        let mut order = ctx.load_order_for(&self.order_id, &metadata.actor)?;

        let reason = self.reason.clone().unwrap_or_else(|| {
            if metadata.actor.is_admin() {
                "Cancelled by admin".to_string()
            } else {
                "Cancelled by customer".to_string()
            }
        });

        cancel_line(ctx, &mut order, &self.item_id, &reason, now)?;

        let refunded = if order.payment_method.is_prepaid() {
            refund_line(ctx, &mut order, &self.item_id, TransactionPurpose::Refund, now)?
        } else {
            0.0
        };

        refresh_aggregates(&mut order);
        if order.status == OrderStatus::Cancelled && order.cancel_reason.is_none() {
            order.cancel_reason = Some(reason);
        }

        tracing::debug!(
            order_id = %self.order_id,
            item_id = %self.item_id,
            refunded,
            "Item cancelled"
        );
        ctx.save_order(order);

        Ok(ActionOutcome::new(&self.order_id).with_refund(refunded))
    }
}
