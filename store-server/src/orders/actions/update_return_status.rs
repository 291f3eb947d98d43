//! UpdateReturnStatus command handler
//!
//! Marks an approved return as received and refunds the line to the wallet,
//! whatever the order was paid with.

use shared::models::TransactionPurpose;
use shared::order::{OrderStatus, RequestStatus};

use super::refund_line;
use crate::orders::reducer::{refresh_aggregates, transition_item};
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};

/// UpdateReturnStatus action
#[derive(Debug, Clone)]
pub struct UpdateReturnStatusAction {
    pub order_id: String,
    pub item_id: String,
    pub status: OrderStatus,
}

impl CommandHandler for UpdateReturnStatusAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        if self.status != OrderStatus::Returned {
            return Err(OrderError::InvalidOperation(format!(
                "Return status can only be set to {}",
                OrderStatus::Returned
            )));
        }

        let now = metadata.timestamp;
        let mut order = ctx.load_order(&self.order_id)?;
        let item = order
            .find_item_mut(&self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;

        if item.request_status != Some(RequestStatus::Approved) {
            return Err(OrderError::ReturnNotApproved(self.item_id.clone()));
        }
        transition_item(item, OrderStatus::Returned, now)?;
        item.returned_on = Some(now);

        let refunded = refund_line(ctx, &mut order, &self.item_id, TransactionPurpose::Return, now)?;

        refresh_aggregates(&mut order);
        tracing::debug!(
            order_id = %self.order_id,
            item_id = %self.item_id,
            refunded,
            "Return received"
        );
        ctx.save_order(order);

        Ok(ActionOutcome::new(&self.order_id).with_refund(refunded))
    }
}
