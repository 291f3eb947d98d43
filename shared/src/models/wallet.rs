//! Wallet Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
}

/// Why money moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionPurpose {
    /// Refund for a cancelled item
    Refund,
    /// Refund for a returned item
    Return,
    /// Top-up through the payment gateway
    Add,
    /// Wallet used as payment method
    Purchase,
    Withdraw,
}

impl TransactionPurpose {
    /// Purposes that count toward `Wallet::refund_amount`
    pub fn is_refund(&self) -> bool {
        matches!(self, Self::Refund | Self::Return)
    }
}

/// One append-only ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub transaction_id: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub purpose: TransactionPurpose,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Gateway payment id for top-ups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Balance right after this entry was applied
    pub balance_after: f64,
    pub created_at: i64,
}

/// Per-user wallet
///
/// `balance` is a cached projection of `transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: String,
    pub balance: f64,
    /// Cumulative refund credits
    pub refund_amount: f64,
    /// Cumulative purchase debits
    pub total_debited: f64,
    #[serde(default)]
    pub transactions: Vec<WalletTransaction>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Wallet {
    /// Empty wallet, created lazily on first credit
    pub fn new(user_id: impl Into<String>, now: i64) -> Self {
        Self {
            user_id: user_id.into(),
            balance: 0.0,
            refund_amount: 0.0,
            total_debited: 0.0,
            transactions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refund or return credit already posted for this ordered item
    pub fn refund_for(&self, order_id: &str, item_id: &str) -> Option<&WalletTransaction> {
        self.transactions.iter().find(|t| {
            t.purpose.is_refund()
                && t.order_id.as_deref() == Some(order_id)
                && t.item_id.as_deref() == Some(item_id)
        })
    }
}

/// Wallet as returned to its owner, newest transactions first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletView {
    pub balance: f64,
    pub refund_amount: f64,
    pub total_debited: f64,
    pub transactions: Vec<WalletTransaction>,
}

impl From<Wallet> for WalletView {
    fn from(wallet: Wallet) -> Self {
        let mut transactions = wallet.transactions;
        transactions.reverse();
        Self {
            balance: wallet.balance,
            refund_amount: wallet.refund_amount,
            total_debited: wallet.total_debited,
            transactions,
        }
    }
}

/// Wallet top-up confirmed by the payment gateway
///
/// Carries no amount: the credit is the amount of the opened gateway order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTopUp {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}
