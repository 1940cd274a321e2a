//! Integration tests for the admin dashboard and store settings.
//!
//! These tests require:
//! - A running MongoDB
//! - The API server running (cargo run -p marigold-server)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` for an existing admin user
//!
//! Run with: cargo test -p marigold-integration-tests -- --ignored

use bson::doc;
use futures::TryStreamExt as _;
use reqwest::StatusCode;
use serde_json::Value;

use marigold_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running API server, MongoDB and admin credentials"]
async fn test_dashboard_revenue_matches_successful_payments() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.admin_token().await;

    let resp = ctx
        .client
        .get(ctx.api("/admin/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse dashboard");

    // Recompute the expected revenue straight from the payments collection.
    let mut cursor = db
        .collection::<bson::Document>("payments")
        .find(doc! { "status": "Success" })
        .await
        .expect("Failed to query payments");
    let mut expected = 0.0_f64;
    while let Some(payment) = cursor.try_next().await.expect("Failed to read payment") {
        expected += payment.get_f64("amount").expect("amount is not an f64");
    }

    let revenue = body
        .get("revenue")
        .and_then(Value::as_f64)
        .expect("dashboard missing revenue");
    assert!(
        (revenue - expected).abs() < 0.01,
        "revenue {revenue} != sum of successful payments {expected}"
    );

    let order_count = body
        .get("order_count")
        .and_then(Value::as_u64)
        .expect("dashboard missing order_count");
    let actual_orders = db
        .collection::<bson::Document>("orders")
        .count_documents(doc! {})
        .await
        .expect("Failed to count orders");
    assert_eq!(order_count, actual_orders);

    let top_products = body
        .get("top_products")
        .and_then(Value::as_array)
        .expect("dashboard missing top_products");
    assert!(top_products.len() <= 5);

    let recent_orders = body
        .get("recent_orders")
        .and_then(Value::as_array)
        .expect("dashboard missing recent_orders");
    assert!(recent_orders.len() <= 10);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB"]
async fn test_dashboard_rejects_non_admin() {
    let ctx = TestContext::new();
    let token = ctx.register_user().await;

    let resp = ctx
        .client
        .get(ctx.api("/admin/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send dashboard request");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB"]
async fn test_settings_singleton_created_lazily() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;

    // First read materializes the document with defaults.
    let resp = ctx
        .client
        .get(ctx.api("/settings"))
        .send()
        .await
        .expect("Failed to load settings");
    assert_eq!(resp.status(), StatusCode::OK);
    let first: Value = resp.json().await.expect("Failed to parse settings");
    assert!(first.get("store_name").and_then(Value::as_str).is_some());

    // Second read returns the same document, never a second one.
    let resp = ctx
        .client
        .get(ctx.api("/settings"))
        .send()
        .await
        .expect("Failed to load settings again");
    assert_eq!(resp.status(), StatusCode::OK);

    let count = db
        .collection::<bson::Document>("settings")
        .count_documents(doc! {})
        .await
        .expect("Failed to count settings documents");
    assert_eq!(count, 1, "settings must stay a singleton");
}

#[tokio::test]
#[ignore = "Requires running API server, MongoDB and admin credentials"]
async fn test_settings_update_requires_admin() {
    let ctx = TestContext::new();
    let token = ctx.register_user().await;

    let form = reqwest::multipart::Form::new().text("store_name", "Not Allowed");
    let resp = ctx
        .client
        .put(ctx.api("/settings"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send settings update");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
