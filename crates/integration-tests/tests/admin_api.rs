//! Integration tests for the admin API.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`ac-cli migrate && ac-cli seed`)
//! - The storefront server running with `SUPER_ADMIN_EMAILS=admin@anekacitra.com`
//!   and `AUTH_RATE_LIMIT_BURST=1000`

#![allow(clippy::unwrap_used)]

use aneka_citra_integration_tests::{
    SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD, SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD,
    TestContext, read_json, unique_email,
};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

async fn admin() -> TestContext {
    TestContext::signed_in(SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD).await
}

async fn customer() -> TestContext {
    TestContext::signed_in(SEED_CUSTOMER_EMAIL, SEED_CUSTOMER_PASSWORD).await
}

fn printer(name: &str) -> Value {
    json!({
        "name": name,
        "brand": "Epson",
        "priceCents": 3_100_000,
        "stock": 4,
        "description": "Printer tinta untuk kantor kecil.",
        "specifications": [
            { "key": "Teknologi Cetak", "value": "Inkjet" },
            { "key": "Konektivitas", "value": "Wi-Fi" },
            { "key": "", "value": "" }
        ],
        "imageUrl": "https://example.com/l3250.jpg"
    })
}

async fn place_customer_order(ctx: &TestContext) -> Value {
    let resp = ctx
        .post_json(
            "/api/orders",
            &json!({ "items": [{ "productId": 1, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    read_json(resp).await
}

// ============================================================================
// Access
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_routes_reject_anonymous_and_customers() {
    let anonymous = TestContext::new();
    assert_eq!(
        anonymous.get("/api/admin/orders").await.status(),
        StatusCode::UNAUTHORIZED
    );

    let customer = customer().await;
    assert_eq!(
        customer.get("/api/admin/orders").await.status(),
        StatusCode::UNAUTHORIZED
    );
    let resp = customer
        .post_json("/api/admin/products", &printer("Sneaky"))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_super_admin_flag_on_me() {
    let ctx = admin().await;

    let me = read_json(ctx.get("/api/auth/me").await).await;
    assert_eq!(me["user"]["role"], "ADMIN");
    assert_eq!(me["isSuperAdmin"], true);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_plain_admin_cannot_manage_admins() {
    let root = admin().await;
    let email = unique_email("staff");

    let resp = root
        .post_json(
            "/api/admin/admins",
            &json!({ "email": email, "password": "staff-pass-123", "name": "Staff" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(read_json(resp).await["role"], "ADMIN");

    let staff = TestContext::signed_in(&email, "staff-pass-123").await;
    assert_eq!(staff.get("/api/admin/orders").await.status(), StatusCode::OK);
    assert_eq!(
        staff.get("/api/admin/admins").await.status(),
        StatusCode::FORBIDDEN
    );
    let resp = staff.post_json("/api/admin/reset-data", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admins = read_json(root.get("/api/admin/admins").await).await;
    assert!(
        admins
            .as_array()
            .unwrap()
            .iter()
            .any(|a| a["email"] == email.as_str())
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_super_admin_registers_admin_and_keeps_session() {
    let root = admin().await;
    let email = unique_email("registered-admin");

    let resp = root
        .post_json(
            "/api/auth/register",
            &json!({ "email": email, "password": "staff-pass-123", "role": "ADMIN" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().get("set-cookie").is_none());
    assert_eq!(read_json(resp).await["user"]["role"], "ADMIN");

    // Still signed in as the super admin.
    let me = read_json(root.get("/api/auth/me").await).await;
    assert_eq!(me["user"]["email"], SEED_ADMIN_EMAIL);

    let staff = TestContext::signed_in(&email, "staff-pass-123").await;
    assert_eq!(staff.get("/api/admin/orders").await.status(), StatusCode::OK);

    // A plain admin cannot do the same.
    let resp = staff
        .post_json(
            "/api/auth/register",
            &json!({ "email": unique_email("nope"), "password": "staff-pass-123", "role": "ADMIN" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_admin_path_needs_admin() {
    assert_eq!(
        TestContext::new().get("/api/admin/nope").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        admin().await.get("/api/admin/nope").await.status(),
        StatusCode::NOT_FOUND
    );
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_product_create_update_delete() {
    let ctx = admin().await;

    let resp = ctx
        .post_json("/api/admin/products", &printer("Epson L3250"))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = read_json(resp).await;
    let id = created["id"].clone();
    assert_eq!(created["specifications"].as_array().unwrap().len(), 2);

    let mut changed = printer("Epson L3250");
    changed["priceCents"] = json!(2_950_000);
    let resp = ctx
        .send_json(Method::PUT, &format!("/api/admin/products/{id}"), &changed)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["priceCents"], 2_950_000);

    let public = read_json(ctx.get(&format!("/api/products/{id}")).await).await;
    assert_eq!(public["priceCents"], 2_950_000);

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/api/admin/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        ctx.get(&format!("/api/products/{id}")).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_invalid_product_is_rejected() {
    let ctx = admin().await;

    let mut draft = printer("Broken");
    draft["priceCents"] = json!(-1);
    let resp = ctx.post_json("/api/admin/products", &draft).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(resp).await["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_ordered_product_cannot_be_deleted() {
    let shopper = customer().await;
    place_customer_order(&shopper).await;

    let ctx = admin().await;
    let resp = ctx
        .client
        .delete(ctx.url("/api/admin/products/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ============================================================================
// Orders & Notifications
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_walks_order_to_completion() {
    let shopper = customer().await;
    let placed = place_customer_order(&shopper).await;
    let order_id = placed["orderId"].clone();
    let path = format!("/api/admin/orders/{order_id}");

    let ctx = admin().await;
    let listed = read_json(ctx.get("/api/admin/orders").await).await;
    let listed = listed
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["id"] == order_id)
        .cloned()
        .unwrap();
    assert_eq!(listed["customer"]["email"], SEED_CUSTOMER_EMAIL);

    for (status, severity) in [
        ("PROCESSING", "INFO"),
        ("SHIPPED", "SUCCESS"),
        ("COMPLETED", "SUCCESS"),
    ] {
        let resp = ctx
            .send_json(Method::PUT, &path, &json!({ "paymentStatus": status }))
            .await;
        assert_eq!(resp.status(), StatusCode::OK, "moving to {status}");
        let outcome = read_json(resp).await;
        assert_eq!(outcome["order"]["paymentStatus"], status);
        assert_eq!(outcome["notification"]["severity"], severity);
    }

    // Repeating the current status is a no-op without a notice.
    let resp = ctx
        .send_json(Method::PUT, &path, &json!({ "paymentStatus": "COMPLETED" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(read_json(resp).await["notification"].is_null());

    let resp = ctx
        .client
        .delete(ctx.url(&path))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_cancel_warns_customer() {
    let shopper = customer().await;
    let placed = place_customer_order(&shopper).await;
    let order_id = placed["orderId"].clone();

    let ctx = admin().await;
    let resp = ctx
        .client
        .delete(ctx.url(&format!("/api/admin/orders/{order_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome = read_json(resp).await;
    assert_eq!(outcome["order"]["paymentStatus"], "CANCELLED");
    assert_eq!(outcome["notification"]["severity"], "WARNING");

    let inbox = read_json(shopper.get("/api/notifications").await).await;
    assert!(
        inbox["notifications"]
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["orderId"] == order_id && n["severity"] == "WARNING")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_sends_notification() {
    let shopper = customer().await;
    let me = read_json(shopper.get("/api/auth/me").await).await;
    let user_id = me["user"]["id"].clone();

    let ctx = admin().await;
    let resp = ctx
        .post_json(
            "/api/admin/notifications",
            &json!({ "userId": user_id, "title": "Promo", "message": "Diskon 10% minggu ini" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = read_json(resp).await;
    assert_eq!(created["severity"], "INFO");
    assert_eq!(created["isRead"], false);

    let resp = ctx
        .post_json(
            "/api/admin/notifications",
            &json!({ "userId": user_id, "title": "  ", "message": "x" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
