//! Payment gateway signatures and settlement
//!
//! The gateway signs `gateway_order_id|payment_id` with HMAC-SHA256 under the
//! shared key secret and hands the hex digest back to the browser. A verified
//! confirmation is then settled against the gateway order the server opened:
//! one payment settles one gateway order, for its owner and purpose only.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::models::{GatewayOrder, PaymentPurpose, SettledPayment};
use shared::order::{GatewayPayment, PaymentReference};
use shared::util::new_id;

use super::WalletError;
use crate::orders::money::money_eq;

/// Currency every gateway order is opened in
pub const CURRENCY: &str = "INR";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct PaymentGateway {
    secret: String,
}

impl std::fmt::Debug for PaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGateway").finish_non_exhaustive()
    }
}

impl PaymentGateway {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac_for(&self, gateway_order_id: &str, payment_id: &str) -> Result<HmacSha256, WalletError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| WalletError::SignatureMismatch)?;
        mac.update(gateway_order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(mac)
    }

    /// Hex signature the gateway would produce
    pub fn sign(&self, gateway_order_id: &str, payment_id: &str) -> Result<String, WalletError> {
        let mac = self.mac_for(gateway_order_id, payment_id)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of a gateway payment confirmation
    pub fn verify(&self, payment: &GatewayPayment) -> Result<(), WalletError> {
        let sig_bytes =
            hex::decode(payment.signature.trim()).map_err(|_| WalletError::MalformedSignature)?;
        self.mac_for(&payment.gateway_order_id, &payment.payment_id)?
            .verify_slice(&sig_bytes)
            .map_err(|_| {
                tracing::warn!(
                    gateway_order_id = %payment.gateway_order_id,
                    payment_id = %payment.payment_id,
                    "Payment signature mismatch"
                );
                WalletError::SignatureMismatch
            })
    }
}

/// Gateway order for `amount`, not yet paid
pub fn open_order(user_id: &str, purpose: PaymentPurpose, amount: f64, now: i64) -> GatewayOrder {
    GatewayOrder {
        gateway_order_id: format!("gw_{}", new_id().replace('-', "")),
        user_id: user_id.to_string(),
        purpose,
        amount,
        currency: CURRENCY.to_string(),
        created_at: now,
        payment_id: None,
        settled_at: None,
    }
}

/// Settle a verified confirmation against its gateway order
///
/// `previous` is whatever the payments table already holds for this payment
/// id. The gateway order is marked settled and the returned record must be
/// stored in the same transaction as the credit or order it pays for.
pub fn settle(
    gateway_order: &mut GatewayOrder,
    previous: Option<&SettledPayment>,
    payment: &PaymentReference,
    user_id: &str,
    purpose: PaymentPurpose,
    now: i64,
) -> Result<SettledPayment, WalletError> {
    if gateway_order.gateway_order_id != payment.gateway_order_id
        || gateway_order.user_id != user_id
        || gateway_order.purpose != purpose
    {
        return Err(WalletError::GatewayOrderNotFound(
            payment.gateway_order_id.clone(),
        ));
    }
    if previous.is_some() || gateway_order.is_settled() {
        tracing::warn!(
            user_id = %user_id,
            gateway_order_id = %payment.gateway_order_id,
            payment_id = %payment.payment_id,
            "Gateway payment replayed"
        );
        return Err(WalletError::PaymentAlreadyCredited(payment.payment_id.clone()));
    }

    gateway_order.payment_id = Some(payment.payment_id.clone());
    gateway_order.settled_at = Some(now);
    Ok(SettledPayment {
        payment_id: payment.payment_id.clone(),
        gateway_order_id: gateway_order.gateway_order_id.clone(),
        user_id: user_id.to_string(),
        purpose,
        amount: gateway_order.amount,
        settled_at: now,
        order_id: None,
    })
}

/// The amount being charged must be the amount the gateway collected
pub fn check_amount(gateway_order: &GatewayOrder, amount: f64) -> Result<(), WalletError> {
    if money_eq(gateway_order.amount, amount) {
        Ok(())
    } else {
        Err(WalletError::PaymentAmountMismatch {
            expected: amount,
            paid: gateway_order.amount,
        })
    }
}
