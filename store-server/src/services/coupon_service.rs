//! Coupon Service
//!
//! Admin CRUD over general coupons, referral coupon issue, and the customer
//! side: available coupons and the apply-coupon quote. Usage is only ever
//! recorded by order placement.

use serde::Serialize;
use shared::models::{
    Coupon, CouponCreate, CouponUpdate, CouponUsage, ReferralCouponIssue,
};
use shared::util::new_id;

use super::cart_service::price_cart;
use super::{ServiceError, ServiceResult};
use crate::coupons::{self, CouponQuote};
use crate::orders::money::{to_decimal, to_f64, validate_percent, validate_price};
use crate::orders::{OrderStorage, StorageError};
use crate::pricing::{self, PricedLine, PricingConfig};

/// Coupons a customer can still use, soonest expiry first
#[derive(Debug, Clone, Serialize)]
pub struct AvailableCoupons {
    pub general: Vec<Coupon>,
    pub referral: Vec<Coupon>,
}

/// Apply-coupon result for the customer's current cart
#[derive(Debug, Clone, Serialize)]
pub struct CouponApplied {
    #[serde(flatten)]
    pub quote: CouponQuote,
    pub shipping_charge: f64,
    pub final_amount: f64,
}

#[derive(Debug, Clone)]
pub struct CouponService {
    storage: OrderStorage,
    pricing: PricingConfig,
}

impl CouponService {
    pub fn new(storage: OrderStorage, pricing: PricingConfig) -> Self {
        Self { storage, pricing }
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// All coupons, newest first
    pub fn list(&self) -> ServiceResult<Vec<Coupon>> {
        let mut coupons = self.storage.get_all_coupons()?;
        coupons.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(coupons)
    }

    pub fn create(&self, data: CouponCreate, now: i64) -> ServiceResult<Coupon> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("coupon name is required".to_string()));
        }

        let coupon = Coupon {
            name,
            offer_price: data.offer_price,
            minimum_price: data.minimum_price,
            max_price: data.max_price,
            created_on: data.created_on.unwrap_or(now),
            expire_on: data.expire_on,
            is_listed: data.is_listed,
            usage: CouponUsage::General {
                redeemed_by: Vec::new(),
            },
        };
        validate_coupon(&coupon)?;

        let txn = self.storage.begin_write()?;
        if self.storage.get_coupon_txn(&txn, &coupon.name)?.is_some() {
            return Err(ServiceError::CouponNameExists(coupon.name));
        }
        self.storage.store_coupon(&txn, &coupon)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(coupon = %coupon.name, offer = coupon.offer_price, "Coupon created");
        Ok(coupon)
    }

    pub fn update(&self, name: &str, data: CouponUpdate) -> ServiceResult<Coupon> {
        let txn = self.storage.begin_write()?;
        let mut coupon = self
            .storage
            .get_coupon_txn(&txn, name)?
            .ok_or_else(|| ServiceError::CouponNotFound(name.to_string()))?;

        if let Some(offer_price) = data.offer_price {
            coupon.offer_price = offer_price;
        }
        if let Some(minimum_price) = data.minimum_price {
            coupon.minimum_price = minimum_price;
        }
        if data.max_price.is_some() {
            coupon.max_price = data.max_price;
        }
        if let Some(created_on) = data.created_on {
            coupon.created_on = created_on;
        }
        if let Some(expire_on) = data.expire_on {
            coupon.expire_on = expire_on;
        }
        if let Some(is_listed) = data.is_listed {
            coupon.is_listed = is_listed;
        }
        validate_coupon(&coupon)?;

        self.storage.store_coupon(&txn, &coupon)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(coupon)
    }

    pub fn delete(&self, name: &str) -> ServiceResult<()> {
        let txn = self.storage.begin_write()?;
        if !self.storage.remove_coupon(&txn, name)? {
            return Err(ServiceError::CouponNotFound(name.to_string()));
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(coupon = %name, "Coupon deleted");
        Ok(())
    }

    /// Issue a single-use coupon to one customer
    pub fn issue_referral(&self, data: ReferralCouponIssue, now: i64) -> ServiceResult<Coupon> {
        let name = match data.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => referral_code(),
        };
        let coupon = Coupon {
            name,
            offer_price: data.offer_price,
            minimum_price: 0.0,
            max_price: None,
            created_on: now,
            expire_on: data.expire_on,
            is_listed: true,
            usage: CouponUsage::Referral {
                owner: data.owner,
                is_used: false,
            },
        };
        validate_coupon(&coupon)?;

        let txn = self.storage.begin_write()?;
        if self.storage.get_coupon_txn(&txn, &coupon.name)?.is_some() {
            return Err(ServiceError::CouponNameExists(coupon.name));
        }
        self.storage.store_coupon(&txn, &coupon)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(coupon = %coupon.name, "Referral coupon issued");
        Ok(coupon)
    }

    // =========================================================================
    // Customer
    // =========================================================================

    pub fn available_for(&self, user_id: &str, now: i64) -> ServiceResult<AvailableCoupons> {
        let all = self.storage.get_all_coupons()?;
        let mut usable: Vec<Coupon> = coupons::available_for(&all, user_id, now)
            .into_iter()
            .cloned()
            .collect();
        usable.sort_by_key(|c| c.expire_on);

        let (referral, general): (Vec<Coupon>, Vec<Coupon>) =
            usable.into_iter().partition(Coupon::is_referral);
        Ok(AvailableCoupons { general, referral })
    }

    /// Quote a coupon against the customer's cart at current prices
    ///
    /// Runs the same checks as order placement without recording any usage.
    pub fn apply(&self, user_id: &str, code: &str, now: i64) -> ServiceResult<CouponApplied> {
        let code = code.trim();
        let cart = self
            .storage
            .get_cart(user_id)?
            .filter(|c| !c.is_empty())
            .ok_or(ServiceError::CartEmpty)?;
        let lines: Vec<PricedLine> = price_cart(&self.storage, &cart)?
            .into_iter()
            .map(|l| l.line)
            .collect();
        let summary = pricing::summarize_cart(&lines, &self.pricing);

        let coupon = self.storage.get_coupon(code)?;
        let quote = coupons::validate(coupon.as_ref(), code, user_id, summary.subtotal, now)?;
        let final_amount = to_f64(
            (to_decimal(quote.total_after_discount) + to_decimal(summary.shipping_charge))
                .max(rust_decimal::Decimal::ZERO),
        );

        tracing::debug!(user_id = %user_id, coupon = %quote.code, discount = quote.discount, "Coupon quoted");
        Ok(CouponApplied {
            quote,
            shipping_charge: summary.shipping_charge,
            final_amount,
        })
    }
}

fn validate_coupon(coupon: &Coupon) -> ServiceResult<()> {
    let invalid = |e: crate::orders::OrderError| ServiceError::Validation(e.to_string());

    validate_percent(coupon.offer_price, "offer_price").map_err(invalid)?;
    validate_price(coupon.minimum_price, "minimum_price").map_err(invalid)?;
    if let Some(max_price) = coupon.max_price {
        validate_price(max_price, "max_price").map_err(invalid)?;
    }
    if coupon.expire_on < coupon.created_on {
        return Err(ServiceError::Validation(
            "expire_on cannot be before created_on".to_string(),
        ));
    }
    Ok(())
}

fn referral_code() -> String {
    let id = new_id().replace('-', "").to_uppercase();
    format!("REF-{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::fixtures::*;

    fn service() -> CouponService {
        CouponService::new(
            OrderStorage::open_in_memory().unwrap(),
            PricingConfig::default(),
        )
    }

    fn create_payload(name: &str) -> CouponCreate {
        CouponCreate {
            name: name.to_string(),
            offer_price: 10.0,
            minimum_price: 0.0,
            max_price: Some(50.0),
            created_on: None,
            expire_on: NOW + 86_400_000,
            is_listed: true,
        }
    }

    #[test]
    fn test_create_and_duplicate_name() {
        let service = service();
        let coupon = service.create(create_payload(" SAVE10 "), NOW).unwrap();
        assert_eq!(coupon.name, "SAVE10");
        assert_eq!(coupon.created_on, NOW);

        assert!(matches!(
            service.create(create_payload("SAVE10"), NOW),
            Err(ServiceError::CouponNameExists(_))
        ));
    }

    #[test]
    fn test_create_validation() {
        let service = service();
        let mut payload = create_payload("BIG");
        payload.offer_price = 120.0;
        assert!(matches!(service.create(payload, NOW), Err(ServiceError::Validation(_))));

        let mut payload = create_payload("BACKWARDS");
        payload.created_on = Some(NOW);
        payload.expire_on = NOW - 1;
        assert!(matches!(service.create(payload, NOW), Err(ServiceError::Validation(_))));

        assert!(matches!(
            service.create(create_payload("  "), NOW),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_update_and_delete() {
        let service = service();
        service.create(create_payload("SAVE10"), NOW).unwrap();

        let updated = service
            .update(
                "SAVE10",
                CouponUpdate {
                    offer_price: Some(15.0),
                    is_listed: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.offer_price, 15.0);
        assert_eq!(updated.max_price, Some(50.0));
        assert!(!updated.is_listed);

        service.delete("SAVE10").unwrap();
        assert!(matches!(service.delete("SAVE10"), Err(ServiceError::CouponNotFound(_))));
        assert!(matches!(
            service.update("SAVE10", CouponUpdate::default()),
            Err(ServiceError::CouponNotFound(_))
        ));
    }

    #[test]
    fn test_issue_referral_generates_code() {
        let service = service();
        let coupon = service
            .issue_referral(
                ReferralCouponIssue {
                    owner: "u-1".to_string(),
                    offer_price: 15.0,
                    expire_on: NOW + 1,
                    name: None,
                },
                NOW,
            )
            .unwrap();

        assert!(coupon.name.starts_with("REF-"));
        assert_eq!(coupon.name.len(), 12);
        assert_eq!(
            coupon.usage,
            CouponUsage::Referral {
                owner: "u-1".to_string(),
                is_used: false
            }
        );
    }

    #[test]
    fn test_available_coupons_split_by_kind() {
        let service = service();
        seed_coupon(&service.storage, &general_coupon("SAVE10", 10.0, None));
        service
            .issue_referral(
                ReferralCouponIssue {
                    owner: "u-1".to_string(),
                    offer_price: 15.0,
                    expire_on: NOW + 1,
                    name: Some("REF-ANNA".to_string()),
                },
                NOW,
            )
            .unwrap();

        let mine = service.available_for("u-1", NOW).unwrap();
        assert_eq!(mine.general.len(), 1);
        assert_eq!(mine.referral[0].name, "REF-ANNA");

        let theirs = service.available_for("u-2", NOW).unwrap();
        assert!(theirs.referral.is_empty());
    }

    #[test]
    fn test_apply_quotes_current_cart() {
        let service = service();
        seed_products(&service.storage, &[product("desk", 1000.0, Some(2))]);
        seed_cart(&service.storage, &cart("u-1", &[("desk", 1, 1000.0)]));
        seed_coupon(&service.storage, &general_coupon("SAVE10", 10.0, Some(50.0)));

        let applied = service.apply("u-1", " SAVE10", NOW).unwrap();
        assert_eq!(applied.quote.discount, 50.0);
        assert_eq!(applied.quote.total_after_discount, 950.0);
        assert_eq!(applied.shipping_charge, 0.0);
        assert_eq!(applied.final_amount, 950.0);

        // Quoting never records usage
        let coupon = service.storage.get_coupon("SAVE10").unwrap().unwrap();
        assert!(!coupon.is_used_by("u-1"));
    }

    #[test]
    fn test_apply_rejections() {
        let service = service();
        assert!(matches!(service.apply("u-1", "SAVE10", NOW), Err(ServiceError::CartEmpty)));

        seed_products(&service.storage, &[product("mug", 100.0, None)]);
        seed_cart(&service.storage, &cart("u-1", &[("mug", 1, 100.0)]));
        let mut coupon = general_coupon("BIGSPEND", 10.0, None);
        coupon.minimum_price = 500.0;
        seed_coupon(&service.storage, &coupon);

        let err = service.apply("u-1", "BIGSPEND", NOW).unwrap_err();
        assert_eq!(err.code(), shared::error::ErrorCode::CouponMinimumNotMet);
        let err = service.apply("u-1", "NOPE", NOW).unwrap_err();
        assert_eq!(err.code(), shared::error::ErrorCode::CouponNotFound);
    }
}
