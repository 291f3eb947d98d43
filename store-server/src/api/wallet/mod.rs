//! Wallet API
//!
//! | Path | Method | |
//! |------|--------|---|
//! | /api/wallet | GET | balance and transactions, newest first |
//! | /api/wallet/top-up/order | POST | open a gateway order for a top-up amount |
//! | /api/wallet/top-up | POST | credit a verified gateway payment |

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use shared::models::{GatewayOrder, TopUpRequest, WalletTopUp, WalletView};
use shared::util::now_millis;

use crate::auth::CurrentCustomer;
use crate::core::ServerState;
use crate::utils::{ApiResult, ok, ok_with_message};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/wallet", get(view))
        .route("/api/wallet/top-up/order", post(open_top_up))
        .route("/api/wallet/top-up", post(top_up))
}

async fn view(State(state): State<ServerState>, customer: CurrentCustomer) -> ApiResult<WalletView> {
    Ok(ok(state.wallet.view(customer.user_id())?))
}

async fn open_top_up(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Json(req): Json<TopUpRequest>,
) -> ApiResult<GatewayOrder> {
    let opened = state.wallet.open_top_up(customer.user_id(), &req, now_millis())?;
    Ok(ok(opened))
}

async fn top_up(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Json(req): Json<WalletTopUp>,
) -> ApiResult<WalletView> {
    let wallet = state.wallet.top_up(customer.user_id(), &req, now_millis())?;
    Ok(ok_with_message(wallet, "Wallet topped up"))
}
