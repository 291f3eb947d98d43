//! Wishlist API
//!
//! | Path | Method | |
//! |------|--------|---|
//! | /api/wishlist | GET | saved products, newest first |
//! | /api/wishlist/{product_id} | POST | save (idempotent) |
//! | /api/wishlist/{product_id} | DELETE | remove |

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use shared::util::now_millis;

use crate::auth::CurrentCustomer;
use crate::core::ServerState;
use crate::services::WishlistLineView;
use crate::utils::{ApiResult, ok, ok_with_message};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/wishlist", get(list))
        .route("/api/wishlist/{product_id}", post(add).delete(remove))
}

#[derive(Debug, Serialize)]
pub struct WishlistItems {
    pub items: Vec<WishlistLineView>,
}

async fn list(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
) -> ApiResult<WishlistItems> {
    let items = state.wishlist.list(customer.user_id())?;
    Ok(ok(WishlistItems { items }))
}

async fn add(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Path(product_id): Path<String>,
) -> ApiResult<WishlistItems> {
    state
        .wishlist
        .add(customer.user_id(), &product_id, now_millis())?;
    let items = state.wishlist.list(customer.user_id())?;
    Ok(ok_with_message(WishlistItems { items }, "Added to wishlist"))
}

async fn remove(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Path(product_id): Path<String>,
) -> ApiResult<WishlistItems> {
    state.wishlist.remove(customer.user_id(), &product_id)?;
    let items = state.wishlist.list(customer.user_id())?;
    Ok(ok_with_message(WishlistItems { items }, "Removed from wishlist"))
}
