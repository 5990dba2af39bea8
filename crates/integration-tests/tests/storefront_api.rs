//! Integration tests for the customer-facing API.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`ac-cli migrate && ac-cli seed`)
//! - The storefront server running with `AUTH_RATE_LIMIT_BURST=1000`
//!   (cargo run -p aneka-citra-storefront)
//! - `PAYMENT_CALLBACK_TOKEN` set to the server's value

#![allow(clippy::unwrap_used)]

use aneka_citra_core::{OrderStatus, Severity};
use aneka_citra_integration_tests::{
    CALLBACK_TOKEN_HEADER, SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD, TestContext,
    callback_token, read_json, unique_email,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn place_order(ctx: &TestContext, product_id: i64, quantity: i64) -> Value {
    let resp = ctx
        .post_json(
            "/api/orders",
            &json!({ "items": [{ "productId": product_id, "quantity": quantity }] }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    read_json(resp).await
}

async fn report_payment(ctx: &TestContext, order_id: &Value, status: &str) -> reqwest::Response {
    ctx.client
        .post(ctx.url("/api/orders/payment-status"))
        .header(CALLBACK_TOKEN_HEADER, callback_token())
        .json(&json!({ "orderId": order_id, "paymentStatus": status }))
        .send()
        .await
        .unwrap()
}

async fn notifications_for_order(ctx: &TestContext, order_id: &Value) -> Vec<Value> {
    let body = read_json(ctx.get("/api/notifications").await).await;
    body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| &n["orderId"] == order_id)
        .cloned()
        .collect()
}

fn status_of(order: &Value) -> OrderStatus {
    serde_json::from_value(order["paymentStatus"].clone()).unwrap()
}

// ============================================================================
// Health & Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health_and_readiness() {
    let ctx = TestContext::new();

    assert_eq!(ctx.get("/health").await.status(), StatusCode::OK);
    assert_eq!(ctx.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_product_listing_is_public() {
    let ctx = TestContext::new();

    let resp = ctx.get("/api/products").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let products = read_json(resp).await;
    let products = products.as_array().unwrap();
    assert!(products.len() >= 8, "seed data should provide 8 printers");

    let first = &products[0];
    let resp = ctx.get(&format!("/api/products/{}", first["id"])).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["name"], first["name"]);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_product_is_404() {
    let ctx = TestContext::new();

    let resp = ctx.get("/api/products/999999").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(read_json(resp).await["error"].is_string());
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_register_then_me() {
    let ctx = TestContext::new();
    let email = unique_email("register");

    let resp = ctx
        .post_json(
            "/api/auth/register",
            &json!({ "email": email, "password": "rahasia123", "name": "Budi" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    assert_eq!(body["user"]["role"], "CUSTOMER");

    let me = read_json(ctx.get("/api/auth/me").await).await;
    assert_eq!(me["user"]["email"], email.as_str());
    assert_eq!(me["isSuperAdmin"], false);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_duplicate_registration_conflicts() {
    let ctx = TestContext::new();

    let resp = ctx
        .post_json(
            "/api/auth/register",
            &json!({ "email": SEED_CUSTOMER_EMAIL, "password": "rahasia123" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_wrong_password_is_rejected() {
    let ctx = TestContext::new();

    let resp = ctx
        .post_json(
            "/api/auth/login",
            &json!({ "email": SEED_CUSTOMER_EMAIL, "password": "wrong-password" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(resp).await["error"], "Invalid email or password");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_logout_ends_session() {
    let ctx = TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await;
    assert_eq!(ctx.get("/api/auth/me").await.status(), StatusCode::OK);

    let resp = ctx.post_json("/api/auth/logout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(ctx.get("/api/auth/me").await.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_orders_require_session() {
    let ctx = TestContext::new();

    assert_eq!(ctx.get("/api/orders").await.status(), StatusCode::UNAUTHORIZED);
    let resp = ctx
        .post_json(
            "/api/orders",
            &json!({ "items": [{ "productId": 1, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_prices_from_catalog() {
    let ctx = TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await;

    let product = read_json(ctx.get("/api/products/1").await).await;
    let unit = product["priceCents"].as_i64().unwrap();

    let placed = place_order(&ctx, 1, 2).await;
    let order = &placed["order"];

    assert_eq!(status_of(order), OrderStatus::Pending);
    assert_eq!(order["totalCents"].as_i64().unwrap(), unit * 2);
    assert_eq!(order["items"][0]["priceCents"].as_i64().unwrap(), unit);
    assert_eq!(order["items"][0]["productName"], product["name"]);
    assert!(placed["invoice"]["paymentUrl"].as_str().unwrap().contains(
        placed["invoice"]["invoiceId"].as_str().unwrap()
    ));

    // Checkout sends nothing to the inbox.
    assert!(notifications_for_order(&ctx, &placed["orderId"]).await.is_empty());

    let mine = read_json(ctx.get("/api/orders").await).await;
    assert!(
        mine.as_array()
            .unwrap()
            .iter()
            .any(|o| o["id"] == placed["orderId"])
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_rejects_bad_carts() {
    let ctx = TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await;

    let empty = ctx.post_json("/api/orders", &json!({ "items": [] })).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let zero = ctx
        .post_json(
            "/api/orders",
            &json!({ "items": [{ "productId": 1, "quantity": 0 }] }),
        )
        .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let unknown = ctx
        .post_json(
            "/api/orders",
            &json!({ "items": [{ "productId": 999_999, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_paid_callback_moves_to_processing_once() {
    let ctx = TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await;
    let placed = place_order(&ctx, 1, 1).await;
    let order_id = &placed["orderId"];

    let resp = report_payment(&ctx, order_id, "PAID").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome = read_json(resp).await;
    assert_eq!(status_of(&outcome["order"]), OrderStatus::Processing);
    assert!(outcome["order"]["paidAt"].is_string());

    let notices = notifications_for_order(&ctx, order_id).await;
    assert_eq!(notices.len(), 1);
    let severity: Severity = serde_json::from_value(notices[0]["severity"].clone()).unwrap();
    assert_eq!(severity, Severity::Success);
    assert_eq!(notices[0]["isRead"], false);

    // A replayed PAID is refused and sends nothing new.
    let replay = report_payment(&ctx, order_id, "PAID").await;
    assert_eq!(replay.status(), StatusCode::CONFLICT);
    assert_eq!(notifications_for_order(&ctx, order_id).await.len(), 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_callback_requires_token() {
    let ctx = TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await;
    let placed = place_order(&ctx, 2, 1).await;

    let resp = ctx
        .post_json(
            "/api/orders/payment-status",
            &json!({ "orderId": placed["orderId"], "paymentStatus": "PAID" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cancelled_payment_warns_customer() {
    let ctx = TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await;
    let placed = place_order(&ctx, 3, 1).await;
    let order_id = &placed["orderId"];

    let resp = report_payment(&ctx, order_id, "CANCELLED").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(status_of(&read_json(resp).await["order"]), OrderStatus::Cancelled);

    let notices = notifications_for_order(&ctx, order_id).await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["severity"], "WARNING");

    // Cancelled is terminal.
    let resp = report_payment(&ctx, order_id, "PAID").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_mark_read_and_read_all() {
    let ctx = TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await;
    let placed = place_order(&ctx, 1, 1).await;
    report_payment(&ctx, &placed["orderId"], "PAID").await;

    let notice = notifications_for_order(&ctx, &placed["orderId"]).await.remove(0);
    let resp = ctx
        .send_json(
            reqwest::Method::PATCH,
            &format!("/api/notifications/{}/read", notice["id"]),
            &json!({}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["isRead"], true);

    let resp = ctx.post_json("/api/notifications/read-all", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let inbox = read_json(ctx.get("/api/notifications").await).await;
    assert_eq!(inbox["unreadCount"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cannot_read_someone_elses_notification() {
    let owner = TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await;
    let placed = place_order(&owner, 1, 1).await;
    report_payment(&owner, &placed["orderId"], "PAID").await;
    let notice = notifications_for_order(&owner, &placed["orderId"]).await.remove(0);

    let other = TestContext::signed_in("aku@gmail.com", SEED_CUSTOMER_PASSWORD).await;
    let resp = other
        .send_json(
            reqwest::Method::PATCH,
            &format!("/api/notifications/{}/read", notice["id"]),
            &json!({}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
