//! ReviewReturn command handler
//!
//! Approve: `return_requested → returning`. Reject: back to `delivered` with
//! the rejection recorded and the uploaded images dropped.

use shared::order::{OrderStatus, RequestStatus, ReturnDecision};

use crate::orders::reducer::{refresh_aggregates, transition_item};
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};

/// ReviewReturn action
#[derive(Debug, Clone)]
pub struct ReviewReturnAction {
    pub order_id: String,
    pub item_id: String,
    pub decision: ReturnDecision,
}

impl CommandHandler for ReviewReturnAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        let now = metadata.timestamp;
        let mut order = ctx.load_order(&self.order_id)?;
        let item = order
            .find_item_mut(&self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;

        if item.status != OrderStatus::ReturnRequested
            || item.request_status != Some(RequestStatus::Pending)
        {
            return Err(OrderError::InvalidOperation(format!(
                "Item {} has no pending return request",
                self.item_id
            )));
        }

        match &self.decision {
            ReturnDecision::Approve => {
                transition_item(item, OrderStatus::Returning, now)?;
                item.request_status = Some(RequestStatus::Approved);
            }
            ReturnDecision::Reject { category, reason } => {
                transition_item(item, OrderStatus::Delivered, now)?;
                item.request_status = Some(RequestStatus::Rejected);
                item.rejection_category = Some(category.clone());
                item.rejection_reason = Some(reason.clone());
                item.return_images.clear();
            }
        }

        tracing::debug!(
            order_id = %self.order_id,
            item_id = %self.item_id,
            decision = ?self.decision,
            "Return reviewed"
        );
        refresh_aggregates(&mut order);
        ctx.save_order(order);
        Ok(ActionOutcome::new(&self.order_id))
    }
}
