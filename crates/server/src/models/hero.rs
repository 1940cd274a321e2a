//! Hero banner slide document.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A slide in the storefront banner carousel (`hero_slides` collection).
///
/// The public listing returns active slides sorted by `order` ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroSlide {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub button_text: String,
    pub image: String,
    /// Sort key within the carousel, lowest first.
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}
