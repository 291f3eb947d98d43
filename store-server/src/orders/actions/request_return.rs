//! RequestReturn command handler
//!
//! A delivered line may be sent back within the return window, counted in
//! whole milliseconds from the moment it was delivered.

use shared::order::{OrderStatus, RequestStatus};
use shared::util::DAY_MILLIS;

use crate::orders::reducer::{refresh_aggregates, transition_item};
use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};

/// RequestReturn action
#[derive(Debug, Clone)]
pub struct RequestReturnAction {
    pub order_id: String,
    pub item_id: String,
    pub reason: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub return_window_days: u32,
}

impl CommandHandler for RequestReturnAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(OrderError::InvalidOperation(
                "A return reason is required".to_string(),
            ));
        }

        let now = metadata.timestamp;
        let window = i64::from(self.return_window_days) * DAY_MILLIS;
        let mut order = ctx.load_order_for(&self.order_id, &metadata.actor)?;
        let item = order
            .find_item_mut(&self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;

        let eligible = item.status == OrderStatus::Delivered
            && item
                .delivered_on
                .is_some_and(|delivered_on| now - delivered_on <= window);
        if !eligible {
            return Err(OrderError::NotEligibleForReturn(self.item_id.clone()));
        }

        transition_item(item, OrderStatus::ReturnRequested, now)?;
        item.request_status = Some(RequestStatus::Pending);
        item.return_reason = Some(reason.to_string());
        item.return_description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);
        item.return_images = self.images.clone();
        item.return_requested_at = Some(now);
        item.rejection_category = None;
        item.rejection_reason = None;

        refresh_aggregates(&mut order);
        ctx.save_order(order);
        Ok(ActionOutcome::new(&self.order_id))
    }
}
