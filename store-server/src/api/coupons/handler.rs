//! Coupon API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Coupon, CouponCreate, CouponUpdate, ReferralCouponIssue};
use shared::util::now_millis;

use crate::auth::{CurrentAdmin, CurrentCustomer};
use crate::core::ServerState;
use crate::services::coupon_service::{AvailableCoupons, CouponApplied};
use crate::utils::{ApiResponse, ApiResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub coupon_code: String,
}

pub async fn apply(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Json(req): Json<ApplyCouponRequest>,
) -> ApiResult<CouponApplied> {
    let applied = state
        .coupons
        .apply(customer.user_id(), &req.coupon_code, now_millis())?;
    Ok(ok_with_message(applied, "Coupon applied"))
}

pub async fn available(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
) -> ApiResult<AvailableCoupons> {
    Ok(ok(state.coupons.available_for(customer.user_id(), now_millis())?))
}

// =========================================================================
// Admin
// =========================================================================

#[derive(Debug, Serialize)]
pub struct CouponList {
    pub coupons: Vec<Coupon>,
}

pub async fn list(State(state): State<ServerState>, _admin: CurrentAdmin) -> ApiResult<CouponList> {
    Ok(ok(CouponList {
        coupons: state.coupons.list()?,
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
    Json(req): Json<CouponCreate>,
) -> ApiResult<Coupon> {
    let coupon = state.coupons.create(req, now_millis())?;
    Ok(ok_with_message(coupon, "Coupon created"))
}

pub async fn update(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
    Path(name): Path<String>,
    Json(req): Json<CouponUpdate>,
) -> ApiResult<Coupon> {
    let coupon = state.coupons.update(&name, req)?;
    Ok(ok_with_message(coupon, "Coupon updated"))
}

pub async fn delete(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
    Path(name): Path<String>,
) -> ApiResult<()> {
    state.coupons.delete(&name)?;
    Ok(Json(ApiResponse::ok("Coupon deleted")))
}

pub async fn issue_referral(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
    Json(req): Json<ReferralCouponIssue>,
) -> ApiResult<Coupon> {
    let coupon = state.coupons.issue_referral(req, now_millis())?;
    Ok(ok_with_message(coupon, "Referral coupon issued"))
}
