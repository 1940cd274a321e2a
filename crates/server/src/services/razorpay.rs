//! Razorpay API client for gateway order creation and signature
//! verification.
//!
//! Online checkout creates a gateway order first; the storefront completes
//! the payment with the Razorpay SDK and posts back the ids plus a
//! signature, which must verify before any document is written.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::RazorpayConfig;

/// Razorpay REST base URL.
const BASE_URL: &str = "https://api.razorpay.com/v1";

/// Outbound request timeout.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when interacting with the Razorpay API.
#[derive(Debug, Error)]
pub enum RazorpayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Provided signature did not match the recomputed one.
    #[error("payment signature verification failed")]
    InvalidSignature,
}

/// A gateway order, as returned by Razorpay.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
}

/// Razorpay API client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    key_id: String,
    key_secret: SecretString,
}

impl RazorpayClient {
    /// Create a new Razorpay client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RazorpayConfig) -> Result<Self, RazorpayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }

    /// The public key id, needed by the storefront checkout SDK.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a gateway order for `amount_paise`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects it.
    pub async fn create_order(
        &self,
        amount_paise: i64,
        receipt: &str,
    ) -> Result<GatewayOrder, RazorpayError> {
        let body = serde_json::json!({
            "amount": amount_paise,
            "currency": "INR",
            "receipt": receipt,
        });

        let response = self
            .client
            .post(format!("{BASE_URL}/orders"))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RazorpayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch a gateway order by id.
    ///
    /// The verify step uses this to reconcile the amount the gateway
    /// actually captured against the order about to be created.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects it.
    pub async fn fetch_order(&self, gateway_order_id: &str) -> Result<GatewayOrder, RazorpayError> {
        let response = self
            .client
            .get(format!("{BASE_URL}/orders/{gateway_order_id}"))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RazorpayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Verify the checkout signature for a captured payment.
    ///
    /// Razorpay signs `"{order_id}|{payment_id}"` with the key secret; the
    /// hex-encoded HMAC-SHA256 must match `signature`. Comparison is
    /// constant-time via the MAC verifier.
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::InvalidSignature` on any mismatch, including
    /// a signature that is not valid hex.
    pub fn verify_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<(), RazorpayError> {
        verify_checkout_signature(
            self.key_secret.expose_secret(),
            gateway_order_id,
            gateway_payment_id,
            signature,
        )
    }
}

/// Recompute and verify the checkout signature.
fn verify_checkout_signature(
    key_secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
) -> Result<(), RazorpayError> {
    let provided = hex::decode(signature).map_err(|_| RazorpayError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .map_err(|_| RazorpayError::InvalidSignature)?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());

    mac.verify_slice(&provided)
        .map_err(|_| RazorpayError::InvalidSignature)
}

/// Convert a rupee amount to integer paise for the gateway.
///
/// Rounds to the nearest paisa to absorb float noise from price sums.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Order totals are far below i64 paise range
pub fn to_paise(amount_rupees: f64) -> i64 {
    (amount_rupees * 100.0).round() as i64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const KEY_SECRET: &str = "test_key_secret_for_signatures";

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(KEY_SECRET.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let signature = sign("order_abc123", "pay_def456");
        assert!(
            verify_checkout_signature(KEY_SECRET, "order_abc123", "pay_def456", &signature)
                .is_ok()
        );
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let mut signature = sign("order_abc123", "pay_def456");
        // Flip the last hex digit
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });

        assert!(matches!(
            verify_checkout_signature(KEY_SECRET, "order_abc123", "pay_def456", &signature),
            Err(RazorpayError::InvalidSignature)
        ));
    }

    #[test]
    fn test_signature_bound_to_ids() {
        let signature = sign("order_abc123", "pay_def456");
        assert!(matches!(
            verify_checkout_signature(KEY_SECRET, "order_other", "pay_def456", &signature),
            Err(RazorpayError::InvalidSignature)
        ));
        assert!(matches!(
            verify_checkout_signature(KEY_SECRET, "order_abc123", "pay_other", &signature),
            Err(RazorpayError::InvalidSignature)
        ));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(matches!(
            verify_checkout_signature(KEY_SECRET, "order_abc123", "pay_def456", "not-hex!"),
            Err(RazorpayError::InvalidSignature)
        ));
    }

    #[test]
    fn test_to_paise() {
        assert_eq!(to_paise(1499.0), 149_900);
        assert_eq!(to_paise(0.0), 0);
        assert_eq!(to_paise(99.99), 9_999);
        // Float noise rounds to the nearest paisa
        assert_eq!(to_paise(10.005), 1_001);
    }
}
