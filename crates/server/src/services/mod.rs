//! Service layer: authentication, checkout orchestration, and third-party
//! collaborator clients (payment gateway, image CDN).

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod media;
pub mod razorpay;

pub use auth::{AuthError, AuthService, TokenClaims};
pub use cart::{CartError, CartService};
pub use checkout::{CheckoutError, CheckoutService};
pub use media::{MediaClient, MediaError};
pub use razorpay::{RazorpayClient, RazorpayError};
