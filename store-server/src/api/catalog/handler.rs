//! Catalog API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{Category, CategoryUpsert, Product, ProductUpsert};
use shared::util::now_millis;

use crate::auth::CurrentAdmin;
use crate::core::ServerState;
use crate::utils::{ApiResponse, ApiResult, ok, ok_with_message};

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

pub async fn list_products(State(state): State<ServerState>) -> ApiResult<ProductList> {
    Ok(ok(ProductList {
        products: state.catalog.list_products(false)?,
    }))
}

pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    Ok(ok(state.catalog.get_product(&id)?))
}

pub async fn list_categories(State(state): State<ServerState>) -> ApiResult<CategoryList> {
    Ok(ok(CategoryList {
        categories: state.catalog.list_categories()?,
    }))
}

pub async fn admin_list_products(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
) -> ApiResult<ProductList> {
    Ok(ok(ProductList {
        products: state.catalog.list_products(true)?,
    }))
}

pub async fn upsert_product(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
    Json(req): Json<ProductUpsert>,
) -> ApiResult<Product> {
    let product = state.catalog.upsert_product(req, now_millis())?;
    Ok(ok_with_message(product, "Product saved"))
}

pub async fn delete_product(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.catalog.delete_product(&id)?;
    Ok(Json(ApiResponse::ok("Product deleted")))
}

pub async fn upsert_category(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
    Json(req): Json<CategoryUpsert>,
) -> ApiResult<Category> {
    let category = state.catalog.upsert_category(req)?;
    Ok(ok_with_message(category, "Category saved"))
}
