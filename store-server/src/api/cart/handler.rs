//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{CartAdd, CartQuantityUpdate};
use shared::util::now_millis;

use crate::auth::CurrentCustomer;
use crate::core::ServerState;
use crate::services::CartView;
use crate::utils::{ApiResult, ok, ok_with_message};

pub async fn view(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
) -> ApiResult<CartView> {
    Ok(ok(state.cart.view(customer.user_id())?))
}

pub async fn add(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Json(req): Json<CartAdd>,
) -> ApiResult<CartView> {
    state.cart.add(customer.user_id(), &req, now_millis())?;
    Ok(ok_with_message(state.cart.view(customer.user_id())?, "Added to cart"))
}

pub async fn change_quantity(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Json(req): Json<CartQuantityUpdate>,
) -> ApiResult<CartView> {
    state
        .cart
        .change_quantity(customer.user_id(), &req, now_millis())?;
    Ok(ok_with_message(state.cart.view(customer.user_id())?, "Cart updated"))
}

pub async fn remove(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Path(product_id): Path<String>,
) -> ApiResult<CartView> {
    state
        .cart
        .remove(customer.user_id(), &product_id, now_millis())?;
    Ok(ok_with_message(
        state.cart.view(customer.user_id())?,
        "Removed from cart",
    ))
}
