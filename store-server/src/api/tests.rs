use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::util::{DAY_MILLIS, now_millis};
use tower::ServiceExt;

use crate::auth::{ADMIN_ID_HEADER, USER_ID_HEADER};
use crate::core::{Config, ServerState, build_router};
use crate::orders::fixtures::*;
use crate::orders::{OrderPolicy, OrderStorage, OrdersManager};
use crate::wallet::PaymentGateway;

const SECRET: &str = "api_test_secret";

fn test_state() -> ServerState {
    let storage = OrderStorage::open_in_memory().unwrap();
    let manager =
        OrdersManager::with_storage(storage, OrderPolicy::default(), PaymentGateway::new(SECRET));
    ServerState::with_manager(Config::defaults(), manager)
}

async fn send(
    state: &ServerState,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = build_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn customer(user_id: &str) -> [(&str, &str); 1] {
    [(USER_ID_HEADER, user_id)]
}

const ADMIN: [(&str, &str); 1] = [(ADMIN_ID_HEADER, "admin-1")];

async fn fill_cart(state: &ServerState, user_id: &str) {
    seed_products(state.storage(), &[product("lamp", 300.0, Some(5))]);
    let (status, body) = send(
        state,
        "POST",
        "/api/cart",
        &customer(user_id),
        Some(json!({"product_id": "lamp", "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["summary"]["final_price"], json!(600.0));
}

async fn place_cod(state: &ServerState, user_id: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
    let mut all = customer(user_id).to_vec();
    all.extend_from_slice(headers);
    send(
        state,
        "POST",
        "/api/orders",
        &all,
        Some(json!({"address": address(), "payment_method": "cod"})),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, body) = send(&state, "GET", "/health", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (_, body) = send(&state, "GET", "/health/detailed", &[], None).await;
    assert_eq!(body["store"]["order_count"], json!(0));
}

#[tokio::test]
async fn test_requests_queue_behind_concurrency_limit() {
    let mut state = test_state();
    // Zero is clamped to one in-flight request
    state.config.max_concurrent_requests = 0;
    let app = build_router(state);

    let get = || Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (first, second) = tokio::join!(app.clone().oneshot(get()), app.clone().oneshot(get()));
    assert_eq!(first.unwrap().status(), StatusCode::OK);
    assert_eq!(second.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn test_place_order_and_read_it_back() {
    let state = test_state();
    fill_cart(&state, "u-1").await;

    let (status, body) = place_cod(&state, "u-1", &[]).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Order placed"));
    assert_eq!(body["duplicate"], json!(false));
    let order_id = body["order_id"].as_str().unwrap().to_string();

    let (_, cart) = send(&state, "GET", "/api/cart", &customer("u-1"), None).await;
    assert_eq!(cart["items"], json!([]));

    let uri = format!("/api/orders/{}", order_id);
    let (status, order) = send(&state, "GET", &uri, &customer("u-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["final_amount"], json!(600.0));
    assert_eq!(order["status"], json!("pending"));

    let (status, body) = send(&state, "GET", &uri, &customer("u-2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!(4001));

    let (_, list) = send(&state, "GET", "/api/admin/orders", &ADMIN, None).await;
    assert_eq!(list["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_idempotency_key_replays_as_duplicate() {
    let state = test_state();
    fill_cart(&state, "u-1").await;

    let key = [("idempotency-key", "place-1")];
    let (_, first) = place_cod(&state, "u-1", &key).await;
    assert_eq!(first["command_id"], json!("place-1"));

    let (status, second) = place_cod(&state, "u-1", &key).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["duplicate"], json!(true));

    let (_, list) = send(&state, "GET", "/api/orders", &customer("u-1"), None).await;
    assert_eq!(list["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_item_with_stale_version() {
    let state = test_state();
    fill_cart(&state, "u-1").await;
    let (_, placed) = place_cod(&state, "u-1", &[]).await;
    let order_id = placed["order_id"].as_str().unwrap().to_string();

    let (_, order) = send(&state, "GET", &format!("/api/orders/{}", order_id), &customer("u-1"), None).await;
    let item_id = order["items"][0]["item_id"].as_str().unwrap().to_string();
    let uri = format!("/api/orders/{}/items/{}/cancel", order_id, item_id);

    let mut headers = customer("u-1").to_vec();
    headers.push(("if-match", "99"));
    let (status, body) = send(&state, "POST", &uri, &headers, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!(4009));

    let (status, body) = send(
        &state,
        "POST",
        &uri,
        &customer("u-1"),
        Some(json!({"reason": "Changed my mind"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, order) = send(&state, "GET", &format!("/api/orders/{}", order_id), &customer("u-1"), None).await;
    assert_eq!(order["status"], json!("cancelled"));
    let lamp = state.storage().get_product("lamp").unwrap().unwrap();
    assert_eq!(lamp.stock, Some(5));
}

#[tokio::test]
async fn test_identity_headers() {
    let state = test_state();

    let (status, body) = send(&state, "GET", "/api/cart", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!(1001));

    let (status, body) = send(&state, "GET", "/api/admin/coupons", &customer("u-1"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], json!(2003));
}

#[tokio::test]
async fn test_apply_coupon_quotes_current_cart() {
    let state = test_state();
    fill_cart(&state, "u-1").await;

    let expire_on = now_millis() + DAY_MILLIS;
    let (status, body) = send(
        &state,
        "POST",
        "/api/admin/coupons",
        &ADMIN,
        Some(json!({"name": "SAVE10", "offer_price": 10.0, "expire_on": expire_on})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = send(
        &state,
        "POST",
        "/api/coupons/apply",
        &customer("u-1"),
        Some(json!({"coupon_code": "SAVE10"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["code"], json!(0));
    assert_eq!(body["coupon_code"], json!("SAVE10"));
    assert_eq!(body["discount"], json!(60.0));
    assert_eq!(body["final_amount"], json!(540.0));

    let (status, body) = send(
        &state,
        "POST",
        "/api/coupons/apply",
        &customer("u-1"),
        Some(json!({"coupon_code": "NOPE"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!(7001));
}

fn signed(gateway_order_id: &str, payment_id: &str) -> Value {
    json!({
        "gateway_order_id": gateway_order_id,
        "payment_id": payment_id,
        "signature": PaymentGateway::new(SECRET).sign(gateway_order_id, payment_id).unwrap(),
    })
}

#[tokio::test]
async fn test_wallet_top_up_credits_the_opened_amount() {
    let state = test_state();
    let (status, opened) = send(
        &state,
        "POST",
        "/api/wallet/top-up/order",
        &customer("u-1"),
        Some(json!({"amount": 250.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", opened);
    assert_eq!(opened["amount"], json!(250.0));
    assert_eq!(opened["currency"], json!("INR"));
    let gw = opened["gateway_order_id"].as_str().unwrap().to_string();

    // A client-side amount is ignored
    let mut top_up = signed(&gw, "pay-1");
    top_up["amount"] = json!(100000.0);
    let (status, body) = send(&state, "POST", "/api/wallet/top-up", &customer("u-1"), Some(top_up)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["balance"], json!(250.0));

    let (status, body) = send(&state, "POST", "/api/wallet/top-up", &customer("u-2"), Some(signed(&gw, "pay-1"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!(5009));

    let (status, body) = send(&state, "POST", "/api/wallet/top-up", &customer("u-1"), Some(signed(&gw, "pay-1"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!(5006));

    let forged = json!({
        "gateway_order_id": gw,
        "payment_id": "pay-2",
        "signature": "00ff",
    });
    let (status, body) = send(&state, "POST", "/api/wallet/top-up", &customer("u-1"), Some(forged)).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], json!(5001));

    let (_, wallet) = send(&state, "GET", "/api/wallet", &customer("u-1"), None).await;
    assert_eq!(wallet["balance"], json!(250.0));
    let (_, wallet) = send(&state, "GET", "/api/wallet", &customer("u-2"), None).await;
    assert_eq!(wallet["balance"], json!(0.0));
}

#[tokio::test]
async fn test_online_checkout_pays_once() {
    let state = test_state();
    fill_cart(&state, "u-1").await;

    let (status, opened) = send(&state, "POST", "/api/orders/payment", &customer("u-1"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK, "{}", opened);
    assert_eq!(opened["amount"], json!(600.0));
    let gw = opened["gateway_order_id"].as_str().unwrap().to_string();

    let place = json!({
        "address": address(),
        "payment_method": "online",
        "payment": signed(&gw, "pay-9"),
    });
    let (status, body) = send(&state, "POST", "/api/orders", &customer("u-1"), Some(place.clone())).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    fill_cart(&state, "u-1").await;
    let (status, body) = send(&state, "POST", "/api/orders", &customer("u-1"), Some(place)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!(5006));

    let (_, list) = send(&state, "GET", "/api/orders", &customer("u-1"), None).await;
    assert_eq!(list["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_catalog_and_wishlist() {
    let state = test_state();
    let (status, body) = send(
        &state,
        "PUT",
        "/api/admin/products",
        &ADMIN,
        Some(json!({"id": "mug", "name": "Mug", "price": 50.0, "stock": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, products) = send(&state, "GET", "/api/products", &[], None).await;
    assert_eq!(products["products"][0]["id"], json!("mug"));

    let (status, body) = send(&state, "POST", "/api/wishlist/mug", &customer("u-1"), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["items"][0]["product_id"], json!("mug"));

    let (status, body) = send(&state, "DELETE", "/api/wishlist/teapot", &customer("u-1"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!(3001));
}

#[tokio::test]
async fn test_sales_report_query() {
    let state = test_state();
    let (status, body) = send(&state, "GET", "/api/admin/reports/sales?report_type=weekly", &ADMIN, None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["summary"]["order_count"], json!(0));

    let (status, body) = send(
        &state,
        "GET",
        "/api/admin/reports/sales?report_type=custom&start_date=2024-02-10",
        &ADMIN,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(2));
}
