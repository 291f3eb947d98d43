//! UpdateOrderStatus command handler
//!
//! Moves every live line to the same fulfilment status. Lines already there
//! are left alone; any line that cannot make the move rejects the command.

use shared::order::OrderStatus;

use crate::orders::reducer::{refresh_aggregates, transition_item};
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};

/// UpdateOrderStatus action
#[derive(Debug, Clone)]
pub struct UpdateOrderStatusAction {
    pub order_id: String,
    pub status: OrderStatus,
}

impl CommandHandler for UpdateOrderStatusAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        if !self.status.is_fulfilment() {
            return Err(OrderError::InvalidOperation(format!(
                "Status {} cannot be set directly",
                self.status
            )));
        }

        let now = metadata.timestamp;
        let mut order = ctx.load_order(&self.order_id)?;
        if order.status == OrderStatus::Cancelled {
            return Err(OrderError::OrderAlreadyCancelled(self.order_id.clone()));
        }

        let pending: Vec<String> = order
            .live_items()
            .filter(|i| i.status != self.status)
            .map(|i| i.item_id.clone())
            .collect();
        if pending.is_empty() {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: self.status,
            });
        }
        if let Some(stuck) = order
            .live_items()
            .find(|i| i.status != self.status && !i.status.can_transition_to(self.status))
        {
            return Err(OrderError::InvalidTransition {
                from: stuck.status,
                to: self.status,
            });
        }

        for item_id in &pending {
            if let Some(item) = order.find_item_mut(item_id) {
                transition_item(item, self.status, now)?;
            }
        }

        refresh_aggregates(&mut order);
        if order.status == OrderStatus::Delivered && order.delivered_on.is_none() {
            order.delivered_on = Some(now);
        }

        ctx.save_order(order);
        Ok(ActionOutcome::new(&self.order_id))
    }
}
