//! Integration tests for registration, login and the server-side cart.
//!
//! These tests require:
//! - A running MongoDB
//! - The API server running (cargo run -p marigold-server)
//!
//! Run with: cargo test -p marigold-integration-tests -- --ignored

use bson::doc;
use bson::oid::ObjectId;
use mongodb::Database;
use reqwest::StatusCode;
use serde_json::{Value, json};

use marigold_integration_tests::TestContext;

async fn seed_product(db: &Database, stock: i64, price: f64) -> ObjectId {
    let id = ObjectId::new();
    db.collection::<bson::Document>("products")
        .insert_one(doc! {
            "_id": id,
            "name": format!("Cart Test Product {}", id.to_hex()),
            "description": "inserted by integration test",
            "price": price,
            "mrp": price,
            "category": ObjectId::new(),
            "brand": "Marigold",
            "stock": stock,
            "images": ["https://example.com/a.jpg"],
            "sizes": ["M", "L"],
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

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and MongoDB"]
async fn test_register_login_me_roundtrip() {
    let ctx = TestContext::new();
    let email = format!("it-{}@example.com", ObjectId::new().to_hex());
    let password = "correct horse battery staple";

    let resp = ctx
        .client
        .post(ctx.api("/auth/register"))
        .json(&json!({ "name": "Asha Rao", "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse register response");
    assert!(body.get("token").is_some());
    // Hashes never leave the server.
    assert!(!body.to_string().contains("password"));

    let resp = ctx
        .client
        .post(ctx.api("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse login response");
    let token = body
        .get("token")
        .and_then(Value::as_str)
        .expect("login missing token");

    let resp = ctx
        .client
        .get(ctx.api("/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = resp.json().await.expect("Failed to parse profile");
    assert_eq!(me.get("email"), Some(&json!(email)));
    assert_eq!(me.get("role"), Some(&json!("user")));
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB"]
async fn test_duplicate_email_rejected() {
    let ctx = TestContext::new();
    let email = format!("it-{}@example.com", ObjectId::new().to_hex());
    let body = json!({ "name": "Asha Rao", "email": email, "password": "correct horse battery staple" });

    let resp = ctx
        .client
        .post(ctx.api("/auth/register"))
        .json(&body)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .post(ctx.api("/auth/register"))
        .json(&body)
        .send()
        .await
        .expect("Failed to send duplicate register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB"]
async fn test_wrong_password_rejected() {
    let ctx = TestContext::new();
    let email = format!("it-{}@example.com", ObjectId::new().to_hex());

    let resp = ctx
        .client
        .post(ctx.api("/auth/register"))
        .json(&json!({ "name": "Asha Rao", "email": email, "password": "correct horse battery staple" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .post(ctx.api("/auth/login"))
        .json(&json!({ "email": email, "password": "wrong password entirely" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Cart Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and MongoDB"]
async fn test_cart_add_update_remove() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;

    let product_id = seed_product(&db, 10, 1799.0).await;

    // Fresh carts are created lazily and start empty.
    let resp = ctx
        .client
        .get(ctx.api("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart.get("subtotal"), Some(&json!(0.0)));

    // Add two, then two more of the same line; quantities merge.
    for _ in 0..2 {
        let resp = ctx
            .client
            .post(ctx.api("/cart/items"))
            .bearer_auth(&token)
            .json(&json!({ "product_id": product_id.to_hex(), "size": "M", "quantity": 2 }))
            .send()
            .await
            .expect("Failed to add cart item");
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let resp = ctx
        .client
        .get(ctx.api("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    let items = cart.get("items").and_then(Value::as_array).expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].get("quantity"), Some(&json!(4)));
    assert_eq!(cart.get("subtotal"), Some(&json!(4.0 * 1799.0)));

    // Set the quantity down.
    let resp = ctx
        .client
        .put(ctx.api(&format!("/cart/items/{}", product_id.to_hex())))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 1, "size": "M" }))
        .send()
        .await
        .expect("Failed to update cart item");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart.get("subtotal"), Some(&json!(1799.0)));

    // Remove the line.
    let resp = ctx
        .client
        .delete(ctx.api(&format!("/cart/items/{}?size=M", product_id.to_hex())))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to remove cart item");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(
        cart.get("items").and_then(Value::as_array).map(Vec::len),
        Some(0)
    );
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB"]
async fn test_cart_add_beyond_stock_rejected() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;

    let product_id = seed_product(&db, 3, 999.0).await;

    let resp = ctx
        .client
        .post(ctx.api("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id.to_hex(), "quantity": 5 }))
        .send()
        .await
        .expect("Failed to send add request");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and MongoDB"]
async fn test_cart_reconciles_deactivated_product() {
    let ctx = TestContext::new();
    let db = TestContext::db().await;
    let token = ctx.register_user().await;

    let product_id = seed_product(&db, 5, 649.0).await;

    let resp = ctx
        .client
        .post(ctx.api("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id.to_hex(), "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add cart item");
    assert_eq!(resp.status(), StatusCode::OK);

    // Deactivate the product behind the cart's back.
    db.collection::<bson::Document>("products")
        .update_one(
            doc! { "_id": product_id },
            doc! { "$set": { "is_active": false } },
        )
        .await
        .expect("Failed to deactivate product");

    // The next read prunes the dead line.
    let resp = ctx
        .client
        .get(ctx.api("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(
        cart.get("items").and_then(Value::as_array).map(Vec::len),
        Some(0)
    );
    assert_eq!(cart.get("subtotal"), Some(&json!(0.0)));
}
