//! HTTP route handlers for the API server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (pings MongoDB)
//!
//! # Auth
//! POST /api/auth/register           - Create account, returns token
//! POST /api/auth/login              - Login, returns token
//! GET  /api/auth/me                 - Current user profile
//!
//! # Products
//! GET    /api/products              - List with filters + pagination
//! GET    /api/products/{id}         - Product detail
//! POST   /api/products              - Create (admin, multipart, 4 images)
//! PUT    /api/products/{id}         - Update (admin, multipart)
//! DELETE /api/products/{id}         - Delete (admin)
//!
//! # Categories
//! GET    /api/categories            - List (active only for public)
//! GET    /api/categories/{id}       - Category detail
//! POST   /api/categories            - Create (admin, multipart)
//! PUT    /api/categories/{id}       - Update (admin, multipart)
//! DELETE /api/categories/{id}       - Delete (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart                  - Fetch (lazily created, reconciled)
//! POST   /api/cart/items            - Add line
//! PUT    /api/cart/items/{id}       - Set line quantity (0 removes)
//! DELETE /api/cart/items/{id}       - Remove line
//! DELETE /api/cart                  - Clear
//!
//! # Orders
//! POST /api/orders                  - Place order (COD or ONLINE)
//! GET  /api/orders/mine             - Caller's orders
//! GET  /api/orders                  - All orders (admin)
//! GET  /api/orders/{id}             - Detail (owner or admin)
//! PUT  /api/orders/{id}/status      - Status transition (admin)
//!
//! # Payments
//! POST /api/payments/verify         - Verify signature, create order
//! GET  /api/payments                - List payments (admin)
//!
//! # Users
//! GET  /api/users/profile           - Profile
//! PUT  /api/users/profile           - Update name/password
//! GET  /api/users/wishlist          - Resolved wishlist products
//! POST   /api/users/wishlist/{id}   - Add to wishlist
//! DELETE /api/users/wishlist/{id}   - Remove from wishlist
//! POST   /api/users/addresses       - Add address
//! PUT    /api/users/addresses/{i}   - Update address by index
//! DELETE /api/users/addresses/{i}   - Remove address by index
//! GET    /api/users                 - List users (admin)
//! PUT    /api/users/{id}/role       - Change role (admin)
//! DELETE /api/users/{id}            - Delete user (admin)
//!
//! # Hero banner
//! GET    /api/hero                  - Active slides (public)
//! GET    /api/hero/all              - All slides (admin)
//! POST   /api/hero                  - Create (admin, multipart)
//! PUT    /api/hero/{id}             - Update (admin, multipart)
//! DELETE /api/hero/{id}             - Delete (admin)
//!
//! # Settings
//! GET /api/settings                 - Singleton (lazily created)
//! PUT /api/settings                 - Update (admin, multipart)
//!
//! # Admin
//! GET /api/admin/dashboard          - Counts, revenue, top products
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod hero;
pub mod orders;
pub mod payments;
pub mod products;
pub mod settings;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use bson::doc;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The authenticated user's id; every stored user has one.
pub(crate) fn owner_id(user: &User) -> Result<bson::oid::ObjectId, AppError> {
    user.id
        .ok_or_else(|| AppError::Internal("authenticated user without _id".to_string()))
}

/// GET /health — process is up.
async fn health() -> &'static str {
    "ok"
}

/// GET /health/ready — MongoDB responds to ping.
async fn ready(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    match state.db().run_command(doc! { "ping": 1 }).await {
        Ok(_) => Ok("ready"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness ping failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{product_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/mine", get(orders::mine))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/verify", post(payments::verify))
        .route("/", get(payments::list))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(users::profile).put(users::update_profile),
        )
        .route("/wishlist", get(users::wishlist))
        .route(
            "/wishlist/{product_id}",
            post(users::wishlist_add).delete(users::wishlist_remove),
        )
        .route("/addresses", post(users::address_add))
        .route(
            "/addresses/{index}",
            put(users::address_update).delete(users::address_remove),
        )
        .route("/", get(users::list))
        .route("/{id}/role", put(users::update_role))
        .route("/{id}", delete(users::delete))
}

fn hero_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(hero::list).post(hero::create))
        .route("/all", get(hero::list_all))
        .route("/{id}", put(hero::update).delete(hero::delete))
}

fn settings_routes() -> Router<AppState> {
    Router::new().route("/", get(settings::show).put(settings::update))
}

fn admin_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(admin::dashboard))
}

/// Create all routes for the API server.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/payments", payment_routes())
        .nest("/users", user_routes())
        .nest("/hero", hero_routes())
        .nest("/settings", settings_routes())
        .nest("/admin", admin_routes());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/api", api)
}
