//! Catalog API
//!
//! | Path | Method | Caller |
//! |------|--------|--------|
//! | /api/products | GET | anyone, unblocked products |
//! | /api/products/{id} | GET | anyone |
//! | /api/categories | GET | anyone |
//! | /api/admin/products | GET, PUT | admin, upsert |
//! | /api/admin/products/{id} | DELETE | admin |
//! | /api/admin/categories | PUT | admin, upsert |

mod handler;

use axum::{
    Router,
    routing::{delete, get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(handler::list_products))
        .route("/api/products/{id}", get(handler::get_product))
        .route("/api/categories", get(handler::list_categories))
        .route(
            "/api/admin/products",
            get(handler::admin_list_products).put(handler::upsert_product),
        )
        .route("/api/admin/products/{id}", delete(handler::delete_product))
        .route("/api/admin/categories", put(handler::upsert_category))
}
