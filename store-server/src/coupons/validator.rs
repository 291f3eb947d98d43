//! Coupon eligibility and discount calculation

use rust_decimal::prelude::*;
use serde::Serialize;
use shared::models::{Coupon, CouponUsage};

use super::CouponRejection;
use crate::orders::money::{percent_of, round2, to_decimal, to_f64};

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponQuote {
    /// `coupon_code` on the wire; `code` is taken by the response envelope
    #[serde(rename = "coupon_code")]
    pub code: String,
    pub discount: f64,
    pub order_total: f64,
    pub total_after_discount: f64,
}

/// Discount a coupon grants on `order_total`, rounded and never above the total
pub fn discount_for(coupon: &Coupon, order_total: f64) -> f64 {
    let total = to_decimal(order_total).max(Decimal::ZERO);
    let mut discount = percent_of(total, to_decimal(coupon.offer_price));

    if let (CouponUsage::General { .. }, Some(cap)) = (&coupon.usage, coupon.max_price) {
        discount = discount.min(to_decimal(cap));
    }

    to_f64(round2(discount).clamp(Decimal::ZERO, total))
}

/// Check whether `user_id` may apply the coupon to an order of `order_total`
///
/// Checks run in order: exists and listed, not expired, usage policy, minimum
/// order value (general coupons only).
pub fn validate(
    coupon: Option<&Coupon>,
    code: &str,
    user_id: &str,
    order_total: f64,
    now: i64,
) -> Result<CouponQuote, CouponRejection> {
    let coupon = coupon
        .filter(|c| c.is_listed)
        .ok_or_else(|| CouponRejection::NotFound(code.to_string()))?;

    if coupon.is_expired(now) {
        return Err(CouponRejection::Expired(coupon.name.clone()));
    }

    match &coupon.usage {
        CouponUsage::Referral { owner, is_used } => {
            if owner != user_id {
                return Err(CouponRejection::NotOwner(coupon.name.clone()));
            }
            if *is_used {
                return Err(CouponRejection::AlreadyUsed(coupon.name.clone()));
            }
        }
        CouponUsage::General { redeemed_by } => {
            if redeemed_by.iter().any(|u| u == user_id) {
                return Err(CouponRejection::AlreadyUsed(coupon.name.clone()));
            }
            if to_decimal(order_total) < to_decimal(coupon.minimum_price) {
                return Err(CouponRejection::BelowMinimum {
                    code: coupon.name.clone(),
                    minimum: coupon.minimum_price,
                });
            }
        }
    }

    let discount = discount_for(coupon, order_total);
    Ok(CouponQuote {
        code: coupon.name.clone(),
        discount,
        order_total,
        total_after_discount: to_f64(to_decimal(order_total) - to_decimal(discount)),
    })
}

/// Record that `user_id` used the coupon
pub fn redeem(coupon: &mut Coupon, user_id: &str) {
    match &mut coupon.usage {
        CouponUsage::Referral { is_used, .. } => *is_used = true,
        CouponUsage::General { redeemed_by } => {
            if !redeemed_by.iter().any(|u| u == user_id) {
                redeemed_by.push(user_id.to_string());
            }
        }
    }
}

/// Coupons `user_id` could still apply: listed, unexpired general coupons they
/// have not redeemed, plus their own unused referral coupons
pub fn available_for<'a>(coupons: &'a [Coupon], user_id: &str, now: i64) -> Vec<&'a Coupon> {
    coupons
        .iter()
        .filter(|c| c.is_listed && !c.is_expired(now))
        .filter(|c| match &c.usage {
            CouponUsage::General { redeemed_by } => !redeemed_by.iter().any(|u| u == user_id),
            CouponUsage::Referral { owner, is_used } => owner == user_id && !*is_used,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general(offer: f64, minimum: f64, max: Option<f64>) -> Coupon {
        Coupon {
            name: "SAVE10".to_string(),
            offer_price: offer,
            minimum_price: minimum,
            max_price: max,
            created_on: 0,
            expire_on: 10_000,
            is_listed: true,
            usage: CouponUsage::General {
                redeemed_by: vec![],
            },
        }
    }

    fn referral(owner: &str, is_used: bool) -> Coupon {
        Coupon {
            name: "REF-ANNA".to_string(),
            offer_price: 15.0,
            minimum_price: 0.0,
            max_price: None,
            created_on: 0,
            expire_on: 10_000,
            is_listed: true,
            usage: CouponUsage::Referral {
                owner: owner.to_string(),
                is_used,
            },
        }
    }

    #[test]
    fn test_general_discount_is_capped() {
        let coupon = general(10.0, 0.0, Some(50.0));
        let quote = validate(Some(&coupon), "SAVE10", "u-1", 1000.0, 5).unwrap();
        assert_eq!(quote.discount, 50.0);
        assert_eq!(quote.total_after_discount, 950.0);
    }

    #[test]
    fn test_general_discount_below_cap() {
        let coupon = general(10.0, 0.0, Some(500.0));
        assert_eq!(discount_for(&coupon, 1000.0), 100.0);
        assert_eq!(discount_for(&general(10.0, 0.0, None), 333.33), 33.33);
    }

    #[test]
    fn test_discount_never_exceeds_total() {
        let coupon = general(150.0, 0.0, None);
        assert_eq!(discount_for(&coupon, 80.0), 80.0);
    }

    #[test]
    fn test_referral_ignores_cap_and_minimum() {
        let mut coupon = referral("u-1", false);
        coupon.max_price = Some(1.0);
        coupon.minimum_price = 5000.0;
        let quote = validate(Some(&coupon), "REF-ANNA", "u-1", 200.0, 5).unwrap();
        assert_eq!(quote.discount, 30.0);
    }

    #[test]
    fn test_used_referral_rejected() {
        let coupon = referral("u-1", true);
        let err = validate(Some(&coupon), "REF-ANNA", "u-1", 200.0, 5).unwrap_err();
        assert_eq!(err, CouponRejection::AlreadyUsed("REF-ANNA".to_string()));
        assert_eq!(err.to_string(), "Coupon REF-ANNA already used");
    }

    #[test]
    fn test_referral_for_someone_else_rejected() {
        let coupon = referral("u-1", false);
        assert_eq!(
            validate(Some(&coupon), "REF-ANNA", "u-2", 200.0, 5),
            Err(CouponRejection::NotOwner("REF-ANNA".to_string()))
        );
    }

    #[test]
    fn test_rejection_order() {
        assert_eq!(
            validate(None, "NOPE", "u-1", 100.0, 5),
            Err(CouponRejection::NotFound("NOPE".to_string()))
        );

        let mut hidden = general(10.0, 0.0, None);
        hidden.is_listed = false;
        assert!(matches!(
            validate(Some(&hidden), "SAVE10", "u-1", 100.0, 5),
            Err(CouponRejection::NotFound(_))
        ));

        // Expired wins over the minimum check
        let coupon = general(10.0, 500.0, None);
        assert!(matches!(
            validate(Some(&coupon), "SAVE10", "u-1", 100.0, 20_000),
            Err(CouponRejection::Expired(_))
        ));

        // Usage wins over the minimum check
        let mut redeemed = general(10.0, 500.0, None);
        redeem(&mut redeemed, "u-1");
        assert!(matches!(
            validate(Some(&redeemed), "SAVE10", "u-1", 100.0, 5),
            Err(CouponRejection::AlreadyUsed(_))
        ));

        assert!(matches!(
            validate(Some(&coupon), "SAVE10", "u-1", 499.99, 5),
            Err(CouponRejection::BelowMinimum { .. })
        ));
        assert!(validate(Some(&coupon), "SAVE10", "u-1", 500.0, 5).is_ok());
    }

    #[test]
    fn test_redeem_is_idempotent_per_user() {
        let mut coupon = general(10.0, 0.0, None);
        redeem(&mut coupon, "u-1");
        redeem(&mut coupon, "u-1");
        match &coupon.usage {
            CouponUsage::General { redeemed_by } => assert_eq!(redeemed_by, &vec!["u-1".to_string()]),
            other => panic!("unexpected usage {:?}", other),
        }
    }

    #[test]
    fn test_available_for_user() {
        let mut redeemed = general(10.0, 0.0, None);
        redeemed.name = "OLD".to_string();
        redeem(&mut redeemed, "u-1");

        let mut expired = general(10.0, 0.0, None);
        expired.name = "GONE".to_string();
        expired.expire_on = 1;

        let coupons = vec![
            general(10.0, 0.0, None),
            redeemed,
            expired,
            referral("u-1", false),
            referral("u-2", false),
        ];
        let names: Vec<&str> = available_for(&coupons, "u-1", 5)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["SAVE10", "REF-ANNA"]);
    }
}
