//! CancelReturn command handler
//!
//! The customer withdraws a return request that has not been reviewed yet.

use shared::order::OrderStatus;

use crate::orders::reducer::{refresh_aggregates, transition_item};
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};

/// CancelReturn action
#[derive(Debug, Clone)]
pub struct CancelReturnAction {
    pub order_id: String,
    pub item_id: String,
}

impl CommandHandler for CancelReturnAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        let now = metadata.timestamp;
        let mut order = ctx.load_order_for(&self.order_id, &metadata.actor)?;
        let item = order
            .find_item_mut(&self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;

        if item.status != OrderStatus::ReturnRequested {
            return Err(OrderError::InvalidTransition {
                from: item.status,
                to: OrderStatus::Delivered,
            });
        }
        transition_item(item, OrderStatus::Delivered, now)?;
        item.clear_return_request();

        refresh_aggregates(&mut order);
        ctx.save_order(order);
        Ok(ActionOutcome::new(&self.order_id))
    }
}
