//! Cart API
//!
//! | Path | Method | |
//! |------|--------|---|
//! | /api/cart | GET | priced cart |
//! | /api/cart | POST | add units |
//! | /api/cart | PUT | step a line up or down |
//! | /api/cart/{product_id} | DELETE | remove a line |
//!
//! Every endpoint answers with the repriced cart.

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/",
            get(handler::view)
                .post(handler::add)
                .put(handler::change_quantity),
        )
        .route("/{product_id}", delete(handler::remove))
}
