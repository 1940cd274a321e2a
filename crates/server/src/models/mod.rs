//! Document models for the seven MongoDB collections, plus the request and
//! response shapes derived from them.
//!
//! Documents use `ObjectId` primary keys (serialized as `_id`) and BSON
//! datetimes via the `bson` chrono serde helpers. Response DTOs live next to
//! the document they project so the "never leak the password hash" rule is
//! enforced where the field is declared.

pub mod cart;
pub mod category;
pub mod dto;
pub mod hero;
pub mod order;
pub mod payment;
pub mod product;
pub mod settings;
pub mod user;

pub use cart::{Cart, CartItem};
pub use category::Category;
pub use hero::HeroSlide;
pub use order::{Order, OrderItem};
pub use payment::Payment;
pub use product::Product;
pub use settings::StoreSettings;
pub use user::{User, UserProfile};
