//! Wallet Ledger
//!
//! - [`ledger`]: credit, debit, proportional refunds and replay
//! - [`gateway`]: payment gateway signatures and settlement

pub mod gateway;
pub mod ledger;

pub use gateway::PaymentGateway;
pub use ledger::{Posting, credit, debit, is_reconciled, refund_for_item, replay, settle_refund};

use shared::order::CommandErrorCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WalletError {
    #[error("Invalid wallet amount: {0}")]
    InvalidAmount(f64),

    #[error("Insufficient wallet balance: required {required}, available {available}")]
    InsufficientBalance { required: f64, available: f64 },

    #[error("Refund already issued for item {item_id} of order {order_id}")]
    RefundAlreadyIssued { order_id: String, item_id: String },

    #[error("Payment {0} has already been settled")]
    PaymentAlreadyCredited(String),

    #[error("Payment covers {paid}, but {expected} is due")]
    PaymentAmountMismatch { expected: f64, paid: f64 },

    #[error("Payment order {0} not found")]
    GatewayOrderNotFound(String),

    #[error("Payment verification failed")]
    SignatureMismatch,

    #[error("Payment signature is not valid hex")]
    MalformedSignature,
}

impl WalletError {
    pub fn code(&self) -> CommandErrorCode {
        match self {
            Self::InvalidAmount(_) => CommandErrorCode::InvalidAmount,
            Self::InsufficientBalance { .. } => CommandErrorCode::InsufficientBalance,
            Self::RefundAlreadyIssued { .. } => CommandErrorCode::RefundAlreadyIssued,
            Self::PaymentAlreadyCredited(_) => CommandErrorCode::PaymentAlreadyCredited,
            Self::PaymentAmountMismatch { .. } => CommandErrorCode::PaymentAmountMismatch,
            Self::GatewayOrderNotFound(_) => CommandErrorCode::GatewayOrderNotFound,
            Self::SignatureMismatch | Self::MalformedSignature => {
                CommandErrorCode::PaymentVerificationFailed
            }
        }
    }
}
