//! Coupon Validator
//!
//! Validation never changes a coupon; usage is only recorded by [`redeem`]
//! inside order placement.

mod validator;

pub use validator::*;

use shared::order::CommandErrorCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CouponRejection {
    #[error("Coupon {0} not found")]
    NotFound(String),

    #[error("Coupon {0} has expired")]
    Expired(String),

    #[error("Coupon {0} already used")]
    AlreadyUsed(String),

    #[error("Coupon {0} is not applicable for this user")]
    NotOwner(String),

    #[error("Coupon {code} requires a minimum order of {minimum}")]
    BelowMinimum { code: String, minimum: f64 },
}

impl CouponRejection {
    pub fn code(&self) -> CommandErrorCode {
        match self {
            Self::NotFound(_) => CommandErrorCode::CouponNotFound,
            Self::Expired(_) => CommandErrorCode::CouponExpired,
            Self::AlreadyUsed(_) => CommandErrorCode::CouponAlreadyUsed,
            Self::NotOwner(_) => CommandErrorCode::CouponNotApplicable,
            Self::BelowMinimum { .. } => CommandErrorCode::CouponMinimumNotMet,
        }
    }
}
