//! Wallet Service
//!
//! Read access for the owner and gateway top-ups. A top-up is opened for an
//! amount first; the gateway confirmation then credits exactly that amount,
//! once across all wallets. Order refunds and wallet payments go through the
//! order commands instead.

use shared::models::{
    GatewayOrder, PaymentPurpose, TopUpRequest, TransactionPurpose, Wallet, WalletTopUp, WalletView,
};
use shared::order::{GatewayPayment, PaymentReference};

use super::ServiceResult;
use crate::orders::money::{to_decimal, to_f64};
use crate::orders::{OrderStorage, StorageError};
use crate::wallet::{self, PaymentGateway, Posting, WalletError, gateway};

#[derive(Debug, Clone)]
pub struct WalletService {
    storage: OrderStorage,
    gateway: PaymentGateway,
}

impl WalletService {
    pub fn new(storage: OrderStorage, gateway: PaymentGateway) -> Self {
        Self { storage, gateway }
    }

    /// Balance and transactions, newest first; an unused wallet is empty
    pub fn view(&self, user_id: &str) -> ServiceResult<WalletView> {
        let wallet = self
            .storage
            .get_wallet(user_id)?
            .unwrap_or_else(|| Wallet::new(user_id, 0));
        Ok(wallet.into())
    }

    /// Open a gateway order for a top-up of `amount`
    pub fn open_top_up(&self, user_id: &str, req: &TopUpRequest, now: i64) -> ServiceResult<GatewayOrder> {
        if !req.amount.is_finite() || req.amount < 1.0 {
            return Err(WalletError::InvalidAmount(req.amount).into());
        }
        let amount = to_f64(to_decimal(req.amount));
        let opened = gateway::open_order(user_id, PaymentPurpose::WalletTopUp, amount, now);

        let txn = self.storage.begin_write()?;
        self.storage.store_gateway_order(&txn, &opened)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            user_id = %user_id,
            gateway_order_id = %opened.gateway_order_id,
            amount,
            "Wallet top-up opened"
        );
        Ok(opened)
    }

    /// Credit a verified gateway payment with the amount of its gateway order
    pub fn top_up(&self, user_id: &str, top_up: &WalletTopUp, now: i64) -> ServiceResult<WalletView> {
        self.gateway.verify(&GatewayPayment {
            gateway_order_id: top_up.gateway_order_id.clone(),
            payment_id: top_up.payment_id.clone(),
            signature: top_up.signature.clone(),
        })?;
        let payment = PaymentReference {
            gateway_order_id: top_up.gateway_order_id.clone(),
            payment_id: top_up.payment_id.clone(),
        };

        let txn = self.storage.begin_write()?;
        let mut opened = self
            .storage
            .get_gateway_order_txn(&txn, &payment.gateway_order_id)?
            .ok_or_else(|| WalletError::GatewayOrderNotFound(payment.gateway_order_id.clone()))?;
        let previous = self.storage.get_payment_txn(&txn, &payment.payment_id)?;
        let settled = gateway::settle(
            &mut opened,
            previous.as_ref(),
            &payment,
            user_id,
            PaymentPurpose::WalletTopUp,
            now,
        )?;

        let mut wallet = self
            .storage
            .get_wallet_txn(&txn, user_id)?
            .unwrap_or_else(|| Wallet::new(user_id, now));
        wallet::credit(
            &mut wallet,
            settled.amount,
            TransactionPurpose::Add,
            "Wallet top-up",
            Posting::for_payment(&settled.payment_id),
            now,
        )?;
        self.storage.store_wallet(&txn, &wallet)?;
        self.storage.store_gateway_order(&txn, &opened)?;
        self.storage.store_payment(&txn, &settled)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            user_id = %user_id,
            payment_id = %settled.payment_id,
            amount = settled.amount,
            balance = wallet.balance,
            "Wallet topped up"
        );
        Ok(wallet.into())
    }
}
