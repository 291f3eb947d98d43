//! RestockItem command handler

use crate::orders::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::stock;

/// RestockItem action
#[derive(Debug, Clone)]
pub struct RestockItemAction {
    pub order_id: String,
    pub item_id: String,
}

impl CommandHandler for RestockItemAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, OrderError> {
        let mut order = ctx.load_order(&self.order_id)?;
        let product_id = order
            .find_item(&self.item_id)
            .map(|i| i.product_id.clone())
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;
        let mut product = ctx.load_product(&product_id)?;

        if let Some(item) = order.find_item_mut(&self.item_id) {
            stock::restock(item, &mut product)?;
            item.updated_on = Some(metadata.timestamp);
        }

        tracing::debug!(
            order_id = %self.order_id,
            item_id = %self.item_id,
            product_id = %product_id,
            stock = ?product.stock,
            "Item restocked"
        );
        ctx.save_product(product);
        ctx.save_order(order);
        Ok(ActionOutcome::new(&self.order_id))
    }
}
