//! Order API Module
//!
//! Every mutation is an order command executed by the `OrdersManager`.
//! An `Idempotency-Key` header becomes the command id, and `If-Match` carries
//! the order version the caller last saw.
//!
//! | Path | Method | Caller |
//! |------|--------|--------|
//! | /api/orders | GET, POST | customer or admin / customer |
//! | /api/orders/payment | POST | customer, open an online payment for the cart |
//! | /api/orders/{order_id} | GET | owner or admin |
//! | /api/orders/{order_id}/items/{item_id}/cancel | POST | owner or admin |
//! | /api/orders/{order_id}/items/{item_id}/return | POST, DELETE | owner |
//! | /api/admin/orders | GET | admin |
//! | /api/admin/orders/{order_id}/cancel | POST | admin |
//! | /api/admin/orders/{order_id}/status | PUT | admin |
//! | /api/admin/orders/{order_id}/items/{item_id}/status | PUT | admin |
//! | /api/admin/orders/{order_id}/items/{item_id}/return | PUT | admin |
//! | /api/admin/orders/{order_id}/items/{item_id}/return-status | PUT | admin |
//! | /api/admin/orders/{order_id}/items/{item_id}/restock | POST | admin |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub use handler::{CommandAccepted, CommandMeta};

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/orders", customer_routes())
        .nest("/api/admin/orders", admin_routes())
}

fn customer_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::place))
        .route("/payment", post(handler::open_payment))
        .route("/{order_id}", get(handler::get_by_id))
        .route("/{order_id}/items/{item_id}/cancel", post(handler::cancel_item))
        .route(
            "/{order_id}/items/{item_id}/return",
            post(handler::request_return).delete(handler::cancel_return),
        )
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::admin_list))
        .route("/{order_id}/cancel", post(handler::cancel_order))
        .route("/{order_id}/status", put(handler::update_order_status))
        .route("/{order_id}/items/{item_id}/status", put(handler::update_item_status))
        .route("/{order_id}/items/{item_id}/return", put(handler::review_return))
        .route(
            "/{order_id}/items/{item_id}/return-status",
            put(handler::update_return_status),
        )
        .route("/{order_id}/items/{item_id}/restock", post(handler::restock_item))
}
