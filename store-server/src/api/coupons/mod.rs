//! Coupon API
//!
//! | Path | Method | Caller |
//! |------|--------|--------|
//! | /api/coupons/apply | POST | customer, quote against the current cart |
//! | /api/coupons/available | GET | customer |
//! | /api/admin/coupons | GET, POST | admin |
//! | /api/admin/coupons/referral | POST | admin |
//! | /api/admin/coupons/{name} | PUT, DELETE | admin |
//!
//! Applying a coupon only quotes it; redemption happens when the order is placed.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/coupons/apply", post(handler::apply))
        .route("/api/coupons/available", get(handler::available))
        .nest("/api/admin/coupons", admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/referral", post(handler::issue_referral))
        .route("/{name}", put(handler::update).delete(handler::delete))
}
