//! Integration tests for the COD checkout flow.
//!
//! These tests require:
//! - A running MongoDB (replica set, for transactions)
//! - The API server running (cargo run -p marigold-server)
//!
//! Run with: cargo test -p marigold-integration-tests -- --ignored

use bson::oid::ObjectId;
use bson::doc;
use mongodb::Database;
use reqwest::StatusCode;
use serde_json::{Value, json};

use marigold_integration_tests::TestContext;

/// Insert a product directly so the test doesn't depend on admin uploads.
async fn seed_product(db: &Database, stock: i64, price: f64) -> ObjectId {
    let id = ObjectId::new();
    db.collection::<bson::Document>("products")
        .insert_one(doc! {
            "_id": id,
            "name": format!("Checkout Test Product {}", id.to_hex()),
            "description": "inserted by integration test",
            "price": price,
            "mrp": price,
            "category": ObjectId::new(),
            "brand": "Marigold",
            "stock": stock,
            "images": ["https://example.com/a.jpg"],
            "sizes": ["M"],
            "is_featured": false,
            "is_bestseller": false,
            "is_active": true,
            "created_at": bson::DateTime::now(),
            "updated_at": bson::DateTime::now(),
        })
        .await
        .expect("Failed to seed product");
    id
}

async fn product_stock(db: &Database, id: ObjectId) -> i64 {
    db.collection::<bson::Document>("products")
        .find_one(doc! { "_id": id })
        .await
        .expect("Failed to load product")
        .expect("Product disappeared")
        .get_i64("stock")
        .expect("stock is not an i64")
}

fn shipping_address() -> Value {
    json!({
        "full_name": "Asha Rao",
        "phone": "9876543210",
        "line1": "14 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "postal_code": "560001",
        "country": "India",
    })
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB replica set"]
async fn test_cod_order_decrements_stock_exactly() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;

    let product_id = seed_product(&db, 10, 1499.0).await;

    let resp = ctx
        .client
        .post(ctx.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [{ "product_id": product_id.to_hex(), "quantity": 3, "size": "M" }],
            "shipping_address": shipping_address(),
            "payment_method": "COD",
        }))
        .send()
        .await
        .expect("Failed to place order");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse order response");
    let order = body.get("order").expect("response missing order");
    assert_eq!(order.get("payment_method"), Some(&json!("COD")));
    assert_eq!(order.get("order_status"), Some(&json!("Processing")));
    assert_eq!(
        order.get("total_price").and_then(Value::as_f64),
        Some(3.0 * 1499.0)
    );

    assert_eq!(product_stock(&db, product_id).await, 7);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB replica set"]
async fn test_over_stock_order_rejected_without_decrement() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;

    let product_id = seed_product(&db, 2, 999.0).await;

    let resp = ctx
        .client
        .post(ctx.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [{ "product_id": product_id.to_hex(), "quantity": 5 }],
            "shipping_address": shipping_address(),
            "payment_method": "COD",
        }))
        .send()
        .await
        .expect("Failed to send order request");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse error response");
    assert!(body.get("message").is_some());

    // The rejected order must leave stock untouched.
    assert_eq!(product_stock(&db, product_id).await, 2);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB replica set"]
async fn test_multi_item_order_is_atomic() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;

    let in_stock = seed_product(&db, 10, 500.0).await;
    let scarce = seed_product(&db, 1, 800.0).await;

    // Second line exceeds stock, so the whole order must abort.
    let resp = ctx
        .client
        .post(ctx.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [
                { "product_id": in_stock.to_hex(), "quantity": 2 },
                { "product_id": scarce.to_hex(), "quantity": 3 },
            ],
            "shipping_address": shipping_address(),
            "payment_method": "COD",
        }))
        .send()
        .await
        .expect("Failed to send order request");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(product_stock(&db, in_stock).await, 10);
    assert_eq!(product_stock(&db, scarce).await, 1);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB replica set"]
async fn test_cancelled_order_restocks_all_lines() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;
    let admin = ctx.admin_token().await;

    let first = seed_product(&db, 10, 500.0).await;
    let second = seed_product(&db, 6, 800.0).await;

    let resp = ctx
        .client
        .post(ctx.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [
                { "product_id": first.to_hex(), "quantity": 2 },
                { "product_id": second.to_hex(), "quantity": 3 },
            ],
            "shipping_address": shipping_address(),
            "payment_method": "COD",
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse order response");
    let order_id = body
        .get("order")
        .and_then(|o| o.get("id"))
        .and_then(Value::as_str)
        .expect("response missing order id")
        .to_owned();

    assert_eq!(product_stock(&db, first).await, 8);
    assert_eq!(product_stock(&db, second).await, 3);

    let resp = ctx
        .client
        .put(ctx.api(&format!("/orders/{order_id}/status")))
        .bearer_auth(&admin)
        .json(&json!({ "status": "Cancelled" }))
        .send()
        .await
        .expect("Failed to cancel order");
    assert_eq!(resp.status(), StatusCode::OK);
    let cancelled: Value = resp.json().await.expect("Failed to parse cancel response");
    assert_eq!(cancelled.get("order_status"), Some(&json!("Cancelled")));

    // Every line returns to the shelves with the status write.
    assert_eq!(product_stock(&db, first).await, 10);
    assert_eq!(product_stock(&db, second).await, 6);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB replica set"]
async fn test_empty_order_rejected() {
    let ctx = TestContext::new();
    let token = ctx.register_user().await;

    let resp = ctx
        .client
        .post(ctx.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [],
            "shipping_address": shipping_address(),
            "payment_method": "COD",
        }))
        .send()
        .await
        .expect("Failed to send order request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB replica set"]
async fn test_order_requires_authentication() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .post(ctx.api("/orders"))
        .json(&json!({
            "items": [{ "product_id": ObjectId::new().to_hex(), "quantity": 1 }],
            "shipping_address": shipping_address(),
            "payment_method": "COD",
        }))
        .send()
        .await
        .expect("Failed to send order request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
