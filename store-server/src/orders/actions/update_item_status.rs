//! UpdateItemStatus command handler
//!
//! Moves one line forward on the fulfilment chain.

use shared::order::OrderStatus;

use crate::orders::reducer::{refresh_aggregates, transition_item};
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};

/// UpdateItemStatus action
#[derive(Debug, Clone)]
pub struct UpdateItemStatusAction {
    pub order_id: String,
    pub item_id: String,
    pub status: OrderStatus,
}

impl CommandHandler for UpdateItemStatusAction {
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
        let item = order
            .find_item_mut(&self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;
        transition_item(item, self.status, now)?;

        refresh_aggregates(&mut order);
        if order.status == OrderStatus::Delivered && order.delivered_on.is_none() {
            order.delivered_on = Some(now);
        }

        ctx.save_order(order);
        Ok(ActionOutcome::new(&self.order_id))
    }
}
