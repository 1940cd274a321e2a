//! JSON response shapes.
//!
//! Documents serialize their `ObjectId`s in BSON extended-JSON form, which
//! is not what API clients want. Each document gets a response projection
//! with plain hex-string ids; conversion is the only logic here.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::Serialize;

use marigold_core::{Address, OrderStatus, PaymentMethod, PaymentStatus};

use super::{Cart, Category, HeroSlide, Order, Payment, Product, StoreSettings};
use crate::db::orders::TopProduct;
use crate::models::payment::GatewayPaymentStatus;

fn hex(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub mrp: f64,
    pub category: String,
    pub brand: String,
    pub stock: i64,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: hex(p.id),
            name: p.name,
            description: p.description,
            price: p.price,
            mrp: p.mrp,
            category: p.category.to_hex(),
            brand: p.brand,
            stock: p.stock,
            images: p.images,
            sizes: p.sizes,
            is_featured: p.is_featured,
            is_bestseller: p.is_bestseller,
            is_active: p.is_active,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub is_active: bool,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: hex(c.id),
            name: c.name,
            description: c.description,
            image: c.image,
            is_active: c.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product: String,
    pub name: String,
    pub image: Option<String>,
    pub size: Option<String>,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user: String,
    pub items: Vec<OrderItemResponse>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: hex(o.id),
            user: o.user.to_hex(),
            items: o
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    product: item.product.to_hex(),
                    name: item.name,
                    image: item.image,
                    size: item.size,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            shipping_address: o.shipping_address,
            payment_method: o.payment_method,
            gateway_order_id: o.gateway_order_id,
            gateway_payment_id: o.gateway_payment_id,
            total_price: o.total_price,
            payment_status: o.payment_status,
            order_status: o.order_status,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub product: String,
    pub size: Option<String>,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub subtotal: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<Cart> for CartResponse {
    fn from(c: Cart) -> Self {
        Self {
            items: c
                .items
                .into_iter()
                .map(|item| CartItemResponse {
                    product: item.product.to_hex(),
                    size: item.size,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            subtotal: c.subtotal,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub order: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub amount: f64,
    pub status: GatewayPaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: hex(p.id),
            order: p.order.to_hex(),
            gateway_order_id: p.gateway_order_id,
            gateway_payment_id: p.gateway_payment_id,
            amount: p.amount,
            status: p.status,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HeroSlideResponse {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub button_text: String,
    pub image: String,
    pub order: i32,
    pub is_active: bool,
}

impl From<HeroSlide> for HeroSlideResponse {
    fn from(s: HeroSlide) -> Self {
        Self {
            id: hex(s.id),
            title: s.title,
            subtitle: s.subtitle,
            button_text: s.button_text,
            image: s.image,
            order: s.order,
            is_active: s.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreSettingsResponse {
    pub id: String,
    pub store_name: String,
    pub logo: Option<String>,
    pub support_email: String,
    pub support_phone: String,
    pub address: String,
}

impl From<StoreSettings> for StoreSettingsResponse {
    fn from(s: StoreSettings) -> Self {
        Self {
            id: hex(s.id),
            store_name: s.store_name,
            logo: s.logo,
            support_email: s.support_email,
            support_phone: s.support_phone,
            address: s.address,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopProductResponse {
    pub product: String,
    pub name: String,
    pub total_quantity: i64,
}

impl From<TopProduct> for TopProductResponse {
    fn from(t: TopProduct) -> Self {
        Self {
            product: t.product.to_hex(),
            name: t.name,
            total_quantity: t.total_quantity,
        }
    }
}
