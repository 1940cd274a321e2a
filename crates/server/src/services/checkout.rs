//! Checkout service: the one multi-step operation in the system.
//!
//! Order placement loads every referenced product in a single query,
//! validates stock per line, computes the total server-side, and then
//! writes the order. For COD the order insert and the per-product stock
//! decrements happen inside one MongoDB transaction; for online payment a
//! gateway order is created first and document creation is deferred to the
//! signature-verify step, which reuses the same transaction shape plus a
//! payment record.

use bson::oid::ObjectId;
use chrono::Utc;
use mongodb::{Client, ClientSession, Database};
use serde::Deserialize;
use thiserror::Error;

use marigold_core::{Address, OrderStatus, PaymentMethod, PaymentStatus};

use crate::db::{
    CartRepository, OrderRepository, PaymentRepository, ProductRepository, RepositoryError,
    parse_object_id,
};
use crate::models::payment::GatewayPaymentStatus;
use crate::models::{Order, OrderItem, Payment, Product};
use crate::services::razorpay::{GatewayOrder, RazorpayClient, RazorpayError, to_paise};

/// A requested order line, as sent by the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<String>,
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Order has no lines.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// A line references a product that doesn't exist (or is inactive).
    #[error("product {product} is not available")]
    UnknownProduct {
        /// Hex id from the request.
        product: String,
    },

    /// A line requests more than the available stock.
    #[error("insufficient stock for {name}: {available} available, {requested} requested")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Shipping address failed validation.
    #[error("invalid shipping address: {0}")]
    InvalidAddress(String),

    /// The gateway captured a different amount than the order total.
    #[error("payment amount mismatch: order total is {expected} paise, gateway captured {captured} paise")]
    AmountMismatch { expected: i64, captured: i64 },

    /// Payment gateway call or signature verification failed.
    #[error(transparent)]
    Gateway(#[from] RazorpayError),

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Validate requested lines against loaded products and build the
/// denormalized order items plus the order total.
///
/// Pure: no I/O. Stock is re-checked later inside the transaction; this
/// pass exists to reject bad requests before touching the gateway or
/// opening a session.
///
/// # Errors
///
/// Rejects empty orders, unknown/inactive products, non-positive
/// quantities, and lines exceeding available stock.
pub fn build_order_items(
    lines: &[OrderLine],
    products: &[Product],
) -> Result<(Vec<OrderItem>, f64), CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let id = parse_object_id(&line.product_id).map_err(|_| CheckoutError::UnknownProduct {
            product: line.product_id.clone(),
        })?;

        let product = products
            .iter()
            .find(|p| p.id == Some(id))
            .filter(|p| p.is_active)
            .ok_or_else(|| CheckoutError::UnknownProduct {
                product: line.product_id.clone(),
            })?;

        if !product.has_stock(line.quantity) {
            return Err(CheckoutError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: line.quantity,
            });
        }

        items.push(OrderItem {
            product: id,
            name: product.name.clone(),
            image: product.images.first().cloned(),
            size: line.size.clone(),
            quantity: line.quantity,
            price: product.price,
        });
    }

    let total = items.iter().map(OrderItem::line_total).sum();
    Ok((items, total))
}

/// Reconcile the order total against the amount the gateway captured.
///
/// The checkout signature only binds the order/payment id pair, so without
/// this check a client could pay a small gateway order and then verify it
/// against a more expensive item list.
///
/// # Errors
///
/// Returns `CheckoutError::AmountMismatch` when the totals differ.
pub fn ensure_amount_matches(
    total_rupees: f64,
    captured_paise: i64,
) -> Result<(), CheckoutError> {
    let expected = to_paise(total_rupees);
    if expected != captured_paise {
        return Err(CheckoutError::AmountMismatch {
            expected,
            captured: captured_paise,
        });
    }
    Ok(())
}

/// Checkout service.
pub struct CheckoutService {
    client: Client,
    orders: OrderRepository,
    products: ProductRepository,
    payments: PaymentRepository,
    carts: CartRepository,
    razorpay: RazorpayClient,
}

impl CheckoutService {
    /// Create a new checkout service.
    #[must_use]
    pub fn new(client: &Client, db: &Database, razorpay: RazorpayClient) -> Self {
        Self {
            client: client.clone(),
            orders: OrderRepository::new(db),
            products: ProductRepository::new(db),
            payments: PaymentRepository::new(db),
            carts: CartRepository::new(db),
            razorpay,
        }
    }

    /// Place a cash-on-delivery order.
    ///
    /// Creates the order and decrements stock atomically, then clears the
    /// user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` for validation failures; the transaction is
    /// aborted and no stock is decremented if any line fails.
    pub async fn place_cod_order(
        &self,
        user: ObjectId,
        lines: &[OrderLine],
        shipping_address: Address,
    ) -> Result<Order, CheckoutError> {
        shipping_address
            .validate()
            .map_err(CheckoutError::InvalidAddress)?;

        let (items, total) = self.load_and_validate(lines).await?;

        let now = Utc::now();
        let mut order = Order {
            id: None,
            user,
            items,
            shipping_address,
            payment_method: PaymentMethod::Cod,
            gateway_order_id: None,
            gateway_payment_id: None,
            total_price: total,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        };

        let order_id = self.commit_order(&order, None).await?;
        order.id = Some(order_id);

        self.carts.clear(user).await?;
        tracing::info!(order = %order_id.to_hex(), total, "COD order placed");
        Ok(order)
    }

    /// Begin an online payment: validate the prospective order and create a
    /// gateway order for its total. No documents are written yet.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` for validation failures or gateway errors.
    pub async fn begin_online_order(
        &self,
        user: ObjectId,
        lines: &[OrderLine],
        shipping_address: &Address,
    ) -> Result<GatewayOrder, CheckoutError> {
        shipping_address
            .validate()
            .map_err(CheckoutError::InvalidAddress)?;

        let (_, total) = self.load_and_validate(lines).await?;

        let receipt = format!("rcpt_{}_{}", user.to_hex(), Utc::now().timestamp());
        let gateway_order = self.razorpay.create_order(to_paise(total), &receipt).await?;

        tracing::info!(
            gateway_order = %gateway_order.id,
            amount_paise = gateway_order.amount,
            "gateway order created"
        );
        Ok(gateway_order)
    }

    /// Verify a completed online payment and, only on success, create the
    /// order, decrement stock, and record the payment in one transaction.
    ///
    /// The gateway order is re-fetched and its amount compared to the
    /// recomputed total before anything is written, so the item list posted
    /// at verify time cannot exceed what was actually paid.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Gateway(RazorpayError::InvalidSignature)` on
    /// a tampered signature and `CheckoutError::AmountMismatch` when the
    /// captured amount differs from the order total; in both cases nothing
    /// is written.
    pub async fn verify_and_place_order(
        &self,
        user: ObjectId,
        lines: &[OrderLine],
        shipping_address: Address,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<Order, CheckoutError> {
        // Signature first: a mismatch must leave no trace.
        self.razorpay
            .verify_signature(gateway_order_id, gateway_payment_id, signature)?;

        shipping_address
            .validate()
            .map_err(CheckoutError::InvalidAddress)?;

        let (items, total) = self.load_and_validate(lines).await?;

        let gateway_order = self.razorpay.fetch_order(gateway_order_id).await?;
        ensure_amount_matches(total, gateway_order.amount)?;

        let now = Utc::now();
        let mut order = Order {
            id: None,
            user,
            items,
            shipping_address,
            payment_method: PaymentMethod::Online,
            gateway_order_id: Some(gateway_order_id.to_owned()),
            gateway_payment_id: Some(gateway_payment_id.to_owned()),
            total_price: total,
            payment_status: PaymentStatus::Paid,
            order_status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        };

        let payment = Payment {
            id: None,
            order: ObjectId::new(), // replaced inside the transaction
            gateway_order_id: gateway_order_id.to_owned(),
            gateway_payment_id: gateway_payment_id.to_owned(),
            gateway_signature: signature.to_owned(),
            amount: total,
            status: GatewayPaymentStatus::Success,
            created_at: now,
        };

        let order_id = self.commit_order(&order, Some(payment)).await?;
        order.id = Some(order_id);

        self.carts.clear(user).await?;
        tracing::info!(
            order = %order_id.to_hex(),
            gateway_payment = gateway_payment_id,
            "online order verified and placed"
        );
        Ok(order)
    }

    /// Cancel an order, returning its stock in the same transaction as the
    /// status write.
    ///
    /// Either the order is `Cancelled` with every line restocked, or
    /// nothing changes; a failure mid-restock cannot leave a cancelled
    /// order holding stock.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the order is missing or the
    /// transaction fails.
    pub async fn cancel_order(
        &self,
        order_id: ObjectId,
        items: &[OrderItem],
    ) -> Result<(), CheckoutError> {
        let mut session = self
            .client
            .start_session()
            .await
            .map_err(RepositoryError::Database)?;
        session
            .start_transaction()
            .await
            .map_err(RepositoryError::Database)?;

        match self.cancel_in_session(&mut session, order_id, items).await {
            Ok(()) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(RepositoryError::Database)?;
                tracing::info!(order = %order_id.to_hex(), "cancelled order restocked");
                Ok(())
            }
            Err(e) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    tracing::warn!(error = %abort_err, "failed to abort cancellation transaction");
                }
                Err(e)
            }
        }
    }

    async fn cancel_in_session(
        &self,
        session: &mut ClientSession,
        order_id: ObjectId,
        items: &[OrderItem],
    ) -> Result<(), CheckoutError> {
        self.orders
            .update_status_in_session(session, order_id, OrderStatus::Cancelled, None)
            .await?;
        for item in items {
            self.products
                .restock(session, item.product, item.quantity)
                .await?;
        }
        Ok(())
    }

    /// Load referenced products in one `$in` query and validate the lines.
    async fn load_and_validate(
        &self,
        lines: &[OrderLine],
    ) -> Result<(Vec<OrderItem>, f64), CheckoutError> {
        let ids: Vec<ObjectId> = lines
            .iter()
            .filter_map(|line| parse_object_id(&line.product_id).ok())
            .collect();
        let products = self.products.find_by_ids(&ids).await?;
        build_order_items(lines, &products)
    }

    /// Run the order insert (+ optional payment insert) and stock
    /// decrements in one transaction.
    async fn commit_order(
        &self,
        order: &Order,
        payment: Option<Payment>,
    ) -> Result<ObjectId, CheckoutError> {
        let mut session = self
            .client
            .start_session()
            .await
            .map_err(RepositoryError::Database)?;
        session
            .start_transaction()
            .await
            .map_err(RepositoryError::Database)?;

        match self
            .commit_order_in_session(&mut session, order, payment)
            .await
        {
            Ok(order_id) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(RepositoryError::Database)?;
                Ok(order_id)
            }
            Err(e) => {
                // Best-effort abort; the original error is the one that matters.
                if let Err(abort_err) = session.abort_transaction().await {
                    tracing::warn!(error = %abort_err, "failed to abort order transaction");
                }
                Err(e)
            }
        }
    }

    async fn commit_order_in_session(
        &self,
        session: &mut ClientSession,
        order: &Order,
        payment: Option<Payment>,
    ) -> Result<ObjectId, CheckoutError> {
        for item in &order.items {
            self.products
                .decrement_stock(session, item.product, item.quantity)
                .await
                .map_err(|e| match e {
                    RepositoryError::InsufficientStock { .. } => {
                        CheckoutError::InsufficientStock {
                            name: item.name.clone(),
                            available: 0, // consumed concurrently; exact count unknown here
                            requested: item.quantity,
                        }
                    }
                    other => CheckoutError::Repository(other),
                })?;
        }

        let order_id = self.orders.insert_in_session(session, order).await?;

        if let Some(mut payment) = payment {
            payment.order = order_id;
            self.payments.insert_in_session(session, &payment).await?;
        }

        Ok(order_id)
    }
}
