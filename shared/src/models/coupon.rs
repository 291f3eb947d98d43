//! Coupon Model

use serde::{Deserialize, Serialize};

/// Usage policy of a coupon
///
/// General coupons are single-use per user; referral coupons are issued to a
/// single recipient and can be redeemed once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CouponUsage {
    General {
        /// Users who already redeemed the coupon (no duplicates)
        #[serde(default)]
        redeemed_by: Vec<String>,
    },
    Referral {
        owner: String,
        #[serde(default)]
        is_used: bool,
    },
}

/// Coupon entity, keyed by its unique code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub name: String,
    /// Discount percentage applied to the order total
    pub offer_price: f64,
    /// Minimum order total (general coupons only)
    #[serde(default)]
    pub minimum_price: f64,
    /// Discount cap (general coupons only)
    #[serde(default)]
    pub max_price: Option<f64>,
    pub created_on: i64,
    pub expire_on: i64,
    #[serde(default = "default_true")]
    pub is_listed: bool,
    pub usage: CouponUsage,
}

fn default_true() -> bool {
    true
}

impl Coupon {
    pub fn is_referral(&self) -> bool {
        matches!(self.usage, CouponUsage::Referral { .. })
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_on < now
    }

    /// Whether `user_id` can no longer redeem this coupon
    pub fn is_used_by(&self, user_id: &str) -> bool {
        match &self.usage {
            CouponUsage::General { redeemed_by } => redeemed_by.iter().any(|u| u == user_id),
            CouponUsage::Referral { is_used, .. } => *is_used,
        }
    }
}

/// Admin payload for creating a general coupon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub name: String,
    pub offer_price: f64,
    #[serde(default)]
    pub minimum_price: f64,
    #[serde(default)]
    pub max_price: Option<f64>,
    /// Defaults to now
    #[serde(default)]
    pub created_on: Option<i64>,
    pub expire_on: i64,
    #[serde(default = "default_true")]
    pub is_listed: bool,
}

/// Admin payload for editing a coupon; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponUpdate {
    pub offer_price: Option<f64>,
    pub minimum_price: Option<f64>,
    pub max_price: Option<f64>,
    pub created_on: Option<i64>,
    pub expire_on: Option<i64>,
    pub is_listed: Option<bool>,
}

/// Issue a referral coupon to a single recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralCouponIssue {
    /// Recipient of the coupon
    pub owner: String,
    pub offer_price: f64,
    pub expire_on: i64,
    /// Generated when omitted
    #[serde(default)]
    pub name: Option<String>,
}
