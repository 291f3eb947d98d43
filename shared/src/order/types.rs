//! Order status, payment and command result types

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Status of an ordered item, and the derived status of its order
///
/// ```text
/// pending → confirmed → shipped → delivered → return_requested → returning → returned
///                                                  └→ delivered (rejected / withdrawn)
/// every non-terminal status → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    ReturnRequested,
    Returning,
    Returned,
}

impl OrderStatus {
    /// Position on the fulfilment chain (pending..delivered)
    fn fulfilment_rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Shipped => Some(2),
            Self::Delivered => Some(3),
            _ => None,
        }
    }

    /// Explicit item transition table
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            // Fulfilment moves forward only, skipping allowed
            (from, to) if from.fulfilment_rank().is_some() && to.fulfilment_rank().is_some() => {
                from.fulfilment_rank() < to.fulfilment_rank()
            }
            (from, Cancelled) => !from.is_terminal(),
            (Delivered, ReturnRequested) => true,
            (ReturnRequested, Returning | Delivered) => true,
            (Returning, Returned) => true,
            _ => false,
        }
    }

    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(OrderStatus::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned)
    }

    /// Item is somewhere between a return request and its completion
    pub fn is_in_return_flow(&self) -> bool {
        matches!(self, Self::ReturnRequested | Self::Returning)
    }

    /// Statuses an admin may set through a plain status update
    pub fn is_fulfilment(&self) -> bool {
        self.fulfilment_rank().is_some()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::ReturnRequested => "return_requested",
            Self::Returning => "returning",
            Self::Returned => "returned",
        };
        f.write_str(s)
    }
}

/// Return workflow decision state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cod,
    Online,
    Wallet,
}

impl PaymentMethod {
    /// Money was collected up front, so cancellations are refunded to the wallet
    pub fn is_prepaid(&self) -> bool {
        matches!(self, Self::Online | Self::Wallet)
    }
}

/// Payment confirmation handed back by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Settled gateway payment recorded on the order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReference {
    pub gateway_order_id: String,
    pub payment_id: String,
}

/// Admin decision on a pending return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReturnDecision {
    Approve,
    Reject { category: String, reason: String },
}

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order the command acted on (absent for duplicates)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Amount credited to the customer's wallet by this command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_amount: Option<f64>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>, refunded_amount: Option<f64>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            refunded_amount,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            refunded_amount: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            refunded_amount: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    ItemNotFound,
    ProductNotFound,
    CartEmpty,
    ItemAlreadyCancelled,
    OrderAlreadyCancelled,
    InvalidTransition,
    NotEligibleForReturn,
    ReturnNotApproved,
    AlreadyRestocked,
    VersionConflict,
    InsufficientStock,
    ProductBlocked,
    InsufficientBalance,
    PaymentRequired,
    PaymentVerificationFailed,
    RefundAlreadyIssued,
    PaymentAlreadyCredited,
    PaymentAmountMismatch,
    GatewayOrderNotFound,
    CouponNotFound,
    CouponExpired,
    CouponAlreadyUsed,
    CouponNotApplicable,
    CouponMinimumNotMet,
    InvalidAmount,
    InvalidOperation,
    PermissionDenied,
    InternalError,
    // Storage errors (maps to ErrorCode 94xx)
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}

impl From<CommandErrorCode> for ErrorCode {
    fn from(code: CommandErrorCode) -> Self {
        match code {
            CommandErrorCode::OrderNotFound => ErrorCode::OrderNotFound,
            CommandErrorCode::ItemNotFound => ErrorCode::OrderItemNotFound,
            CommandErrorCode::ProductNotFound => ErrorCode::ProductNotFound,
            CommandErrorCode::CartEmpty => ErrorCode::CartEmpty,
            CommandErrorCode::ItemAlreadyCancelled => ErrorCode::ItemAlreadyCancelled,
            CommandErrorCode::OrderAlreadyCancelled => ErrorCode::OrderAlreadyCancelled,
            CommandErrorCode::InvalidTransition => ErrorCode::InvalidStatusTransition,
            CommandErrorCode::NotEligibleForReturn => ErrorCode::NotEligibleForReturn,
            CommandErrorCode::ReturnNotApproved => ErrorCode::ReturnNotApproved,
            CommandErrorCode::AlreadyRestocked => ErrorCode::AlreadyRestocked,
            CommandErrorCode::VersionConflict => ErrorCode::OrderVersionConflict,
            CommandErrorCode::InsufficientStock => ErrorCode::InsufficientStock,
            CommandErrorCode::ProductBlocked => ErrorCode::ProductBlocked,
            CommandErrorCode::InsufficientBalance => ErrorCode::InsufficientBalance,
            CommandErrorCode::PaymentRequired => ErrorCode::PaymentRequired,
            CommandErrorCode::PaymentVerificationFailed => ErrorCode::PaymentVerificationFailed,
            CommandErrorCode::RefundAlreadyIssued => ErrorCode::RefundAlreadyIssued,
            CommandErrorCode::PaymentAlreadyCredited => ErrorCode::PaymentAlreadyCredited,
            CommandErrorCode::PaymentAmountMismatch => ErrorCode::PaymentAmountMismatch,
            CommandErrorCode::GatewayOrderNotFound => ErrorCode::GatewayOrderNotFound,
            CommandErrorCode::CouponNotFound => ErrorCode::CouponNotFound,
            CommandErrorCode::CouponExpired => ErrorCode::CouponExpired,
            CommandErrorCode::CouponAlreadyUsed => ErrorCode::CouponAlreadyUsed,
            CommandErrorCode::CouponNotApplicable => ErrorCode::CouponNotApplicable,
            CommandErrorCode::CouponMinimumNotMet => ErrorCode::CouponMinimumNotMet,
            CommandErrorCode::InvalidAmount => ErrorCode::InvalidAmount,
            CommandErrorCode::InvalidOperation => ErrorCode::InvalidOrderOperation,
            CommandErrorCode::PermissionDenied => ErrorCode::PermissionDenied,
            CommandErrorCode::InternalError => ErrorCode::InternalError,
            CommandErrorCode::StorageFull => ErrorCode::StorageFull,
            CommandErrorCode::OutOfMemory => ErrorCode::OutOfMemory,
            CommandErrorCode::StorageCorrupted => ErrorCode::StorageCorrupted,
            CommandErrorCode::SystemBusy => ErrorCode::SystemBusy,
        }
    }
}

impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        AppError::with_message(err.code.into(), err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_fulfilment_moves_forward_only() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Delivered));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Shipped));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }

    #[test]
    fn test_any_non_terminal_status_is_cancellable() {
        for status in [Pending, Confirmed, Shipped, Delivered, ReturnRequested, Returning] {
            assert!(status.is_cancellable(), "{status} should be cancellable");
        }
        assert!(!Cancelled.is_cancellable());
        assert!(!Returned.is_cancellable());
    }

    #[test]
    fn test_return_flow_edges() {
        assert!(Delivered.can_transition_to(ReturnRequested));
        assert!(ReturnRequested.can_transition_to(Returning));
        assert!(ReturnRequested.can_transition_to(Delivered));
        assert!(Returning.can_transition_to(Returned));
        assert!(!Returning.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(ReturnRequested));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        let all = [
            Pending,
            Confirmed,
            Shipped,
            Delivered,
            Cancelled,
            ReturnRequested,
            Returning,
            Returned,
        ];
        for to in all {
            assert!(!Cancelled.can_transition_to(to));
            assert!(!Returned.can_transition_to(to));
        }
    }

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&ReturnRequested).unwrap(),
            "\"return_requested\""
        );
        assert_eq!(ReturnRequested.to_string(), "return_requested");
    }

    #[test]
    fn test_command_error_code_maps_to_error_code() {
        assert_eq!(
            ErrorCode::from(CommandErrorCode::NotEligibleForReturn),
            ErrorCode::NotEligibleForReturn
        );
        assert_eq!(
            ErrorCode::from(CommandErrorCode::VersionConflict),
            ErrorCode::OrderVersionConflict
        );
    }

    #[test]
    fn test_command_error_into_app_error() {
        let err: AppError = CommandError::new(
            CommandErrorCode::CouponAlreadyUsed,
            "Coupon REF-ANNA already used",
        )
        .into();
        assert_eq!(err.code, ErrorCode::CouponAlreadyUsed);
        assert_eq!(err.message, "Coupon REF-ANNA already used");
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);
    }
}
