//! Integration tests for online payment verification.
//!
//! These tests require:
//! - A running MongoDB (replica set, for transactions)
//! - The API server running (cargo run -p marigold-server)
//!
//! A tampered signature never touches the gateway, so no Razorpay
//! credentials are needed here.
//!
//! Run with: cargo test -p marigold-integration-tests -- --ignored

use bson::doc;
use bson::oid::ObjectId;
use mongodb::Database;
use reqwest::StatusCode;
use serde_json::json;

use marigold_integration_tests::TestContext;

async fn seed_product(db: &Database, stock: i64, price: f64) -> ObjectId {
    let id = ObjectId::new();
    db.collection::<bson::Document>("products")
        .insert_one(doc! {
            "_id": id,
            "name": format!("Verify Test Product {}", id.to_hex()),
            "description": "inserted by integration test",
            "price": price,
            "mrp": price,
            "category": ObjectId::new(),
            "brand": "Marigold",
            "stock": stock,
            "images": ["https://example.com/a.jpg"],
            "sizes": [],
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

#[tokio::test]
#[ignore = "Requires running API server and MongoDB replica set"]
async fn test_tampered_signature_leaves_no_trace() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;

    let product_id = seed_product(&db, 5, 2899.0).await;
    let gateway_order_id = format!("order_it_{}", ObjectId::new().to_hex());

    let resp = ctx
        .client
        .post(ctx.api("/payments/verify"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [{ "product_id": product_id.to_hex(), "quantity": 1 }],
            "shipping_address": {
                "full_name": "Asha Rao",
                "phone": "9876543210",
                "line1": "14 MG Road",
                "city": "Bengaluru",
                "state": "Karnataka",
                "postal_code": "560001",
                "country": "India",
            },
            "gateway_order_id": gateway_order_id,
            "gateway_payment_id": "pay_bogus",
            "signature": "deadbeef",
        }))
        .send()
        .await
        .expect("Failed to send verify request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // No order, no payment, no stock movement.
    let order = db
        .collection::<bson::Document>("orders")
        .find_one(doc! { "gateway_order_id": &gateway_order_id })
        .await
        .expect("Failed to query orders");
    assert!(order.is_none(), "tampered verify must not create an order");

    let payment = db
        .collection::<bson::Document>("payments")
        .find_one(doc! { "gateway_order_id": &gateway_order_id })
        .await
        .expect("Failed to query payments");
    assert!(
        payment.is_none(),
        "tampered verify must not create a payment"
    );

    let stock = db
        .collection::<bson::Document>("products")
        .find_one(doc! { "_id": product_id })
        .await
        .expect("Failed to query product")
        .expect("Product disappeared")
        .get_i64("stock")
        .expect("stock is not an i64");
    assert_eq!(stock, 5);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB replica set"]
async fn test_verify_requires_authentication() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .post(ctx.api("/payments/verify"))
        .json(&json!({
            "items": [],
            "shipping_address": {
                "full_name": "x", "phone": "x", "line1": "x",
                "city": "x", "state": "x", "postal_code": "x", "country": "x",
            },
            "gateway_order_id": "order_x",
            "gateway_payment_id": "pay_x",
            "signature": "sig",
        }))
        .send()
        .await
        .expect("Failed to send verify request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server, MongoDB and Razorpay test credentials"]
async fn test_online_order_returns_gateway_order() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;

    let product_id = seed_product(&db, 5, 649.0).await;

    let resp = ctx
        .client
        .post(ctx.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [{ "product_id": product_id.to_hex(), "quantity": 2 }],
            "shipping_address": {
                "full_name": "Asha Rao",
                "phone": "9876543210",
                "line1": "14 MG Road",
                "city": "Bengaluru",
                "state": "Karnataka",
                "postal_code": "560001",
                "country": "India",
            },
            "payment_method": "ONLINE",
        }))
        .send()
        .await
        .expect("Failed to place online order");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");
    let gateway_order = body.get("gateway_order").expect("missing gateway_order");

    // Amount travels in paise.
    assert_eq!(
        gateway_order.get("amount").and_then(serde_json::Value::as_i64),
        Some(129_800)
    );
    assert!(body.get("key_id").is_some());

    // The order document is only written after successful verification.
    let gateway_order_id = gateway_order
        .get("id")
        .and_then(serde_json::Value::as_str)
        .expect("gateway order missing id");
    let order = db
        .collection::<bson::Document>("orders")
        .find_one(doc! { "gateway_order_id": gateway_order_id })
        .await
        .expect("Failed to query orders");
    assert!(order.is_none());
}
