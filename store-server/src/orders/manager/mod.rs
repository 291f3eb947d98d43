//! OrdersManager - command processing
//!
//! Every order mutation enters here as an [`OrderCommand`] and is executed
//! inside exactly one redb write transaction.
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Role check (customer / admin commands)
//!     ├─ 2. Idempotency check (command_id)
//!     ├─ 3. Gateway signature check for online payments
//!     ├─ 4. Begin write transaction (+ idempotency double check)
//!     ├─ 5. Optimistic version check (expected_version)
//!     ├─ 6. Convert command to action and execute against CommandContext
//!     ├─ 7. Persist every document the action staged
//!     ├─ 8. Mark command processed
//!     ├─ 9. Commit transaction
//!     └─ 10. Return response
//! ```
//!
//! Any error before step 9 drops the transaction, so stock, coupon usage,
//! wallet entries, the payment settlement, the order and the cart change
//! together or not at all.

mod error;
pub use error::*;

use std::path::Path;

use shared::order::{
    Actor, CommandResponse, Order, OrderCommand, OrderCommandPayload, PaymentMethod,
};

use super::actions::CommandAction;
use super::storage::{OrderStorage, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError, OrderPolicy};
use crate::wallet::PaymentGateway;

/// OrdersManager for command processing
pub struct OrdersManager {
    storage: OrderStorage,
    policy: OrderPolicy,
    gateway: PaymentGateway,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("policy", &self.policy)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        policy: OrderPolicy,
        gateway: PaymentGateway,
    ) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Ok(Self::with_storage(storage, policy, gateway))
    }

    /// Create an OrdersManager over an already opened storage
    pub fn with_storage(storage: OrderStorage, policy: OrderPolicy, gateway: PaymentGateway) -> Self {
        tracing::info!(
            free_shipping_threshold = policy.pricing.free_shipping_threshold,
            shipping_charge = policy.pricing.shipping_charge,
            return_window_days = policy.return_window_days,
            "OrdersManager started"
        );
        Self {
            storage,
            policy,
            gateway,
        }
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    pub fn policy(&self) -> &OrderPolicy {
        &self.policy
    }

    pub fn gateway(&self) -> &PaymentGateway {
        &self.gateway
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        let command_id = cmd.command_id.clone();
        match self.process_command(cmd) {
            Ok(response) => response,
            Err(err) => {
                if let ManagerError::Order(e) = &err {
                    tracing::warn!(command_id = %command_id, error = %e, "Command rejected");
                }
                CommandResponse::error(command_id, err.into())
            }
        }
    }

    fn process_command(&self, cmd: OrderCommand) -> ManagerResult<CommandResponse> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Role check
        check_role(&cmd.actor, &cmd.payload)?;

        // 2. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok(CommandResponse::duplicate(cmd.command_id));
        }

        // 3. Gateway confirmation is checked before anything is opened for writing
        if let OrderCommandPayload::PlaceOrder {
            payment_method: PaymentMethod::Online,
            payment,
            ..
        } = &cmd.payload
        {
            let payment = payment.as_ref().ok_or(OrderError::PaymentRequired)?;
            self.gateway.verify(payment).map_err(OrderError::from)?;
        }

        // 4. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok(CommandResponse::duplicate(cmd.command_id));
        }

        // 5. Optimistic version check
        if let (Some(expected), Some(order_id)) = (cmd.expected_version, cmd.payload.order_id())
            && let Some(current) = self.storage.get_order_txn(&txn, order_id)?
            && current.version != expected
        {
            return Err(OrderError::VersionConflict {
                expected,
                actual: current.version,
            }
            .into());
        }

        // 6. Create context and execute
        let mut ctx = CommandContext::new(&txn, &self.storage);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            actor: cmd.actor.clone(),
            timestamp: cmd.timestamp,
        };
        let action = CommandAction::from_command(&cmd, &self.policy);
        let outcome = action.execute(&mut ctx, &metadata)?;

        // 7. Persist staged documents
        for order in ctx.modified_orders() {
            let mut order = order.clone();
            order.version += 1;
            order.updated_on = cmd.timestamp;
            self.storage.store_order(&txn, &order)?;
        }
        for product in ctx.modified_products() {
            self.storage.store_product(&txn, product)?;
        }
        for coupon in ctx.modified_coupons() {
            self.storage.store_coupon(&txn, coupon)?;
        }
        for wallet in ctx.modified_wallets() {
            self.storage.store_wallet(&txn, wallet)?;
        }
        for cart in ctx.modified_carts() {
            self.storage.store_cart(&txn, cart)?;
        }
        for opened in ctx.modified_gateway_orders() {
            self.storage.store_gateway_order(&txn, opened)?;
        }
        for settled in ctx.modified_payments() {
            self.storage.store_payment(&txn, settled)?;
        }

        // 8. Mark command processed
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 9. Commit transaction
        txn.commit().map_err(StorageError::from)?;

        // 10. Return response
        tracing::info!(
            command_id = %cmd.command_id,
            order_id = %outcome.order_id,
            refunded = ?outcome.refunded,
            "Command processed successfully"
        );
        Ok(CommandResponse::success(
            cmd.command_id,
            Some(outcome.order_id),
            outcome.refunded,
        ))
    }

    // ========== Queries ==========

    /// Order as seen by `actor`; another customer's order is reported as missing
    pub fn get_order_for(&self, order_id: &str, actor: &Actor) -> ManagerResult<Order> {
        self.storage
            .get_order(order_id)?
            .filter(|o| actor.can_access(&o.user_id))
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()).into())
    }

    /// Orders visible to `actor`, newest first
    pub fn list_orders_for(&self, actor: &Actor) -> ManagerResult<Vec<Order>> {
        let orders = match actor {
            Actor::Customer { user_id } => self.storage.get_orders_for_user(user_id)?,
            Actor::Admin { .. } => self.storage.get_all_orders()?,
        };
        Ok(orders)
    }
}

fn check_role(actor: &Actor, payload: &OrderCommandPayload) -> Result<(), OrderError> {
    if payload.requires_admin() && !actor.is_admin() {
        return Err(OrderError::PermissionDenied(
            "This command is reserved for administrators".to_string(),
        ));
    }
    if payload.requires_customer() && actor.is_admin() {
        return Err(OrderError::PermissionDenied(
            "This command must be issued by the customer".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
