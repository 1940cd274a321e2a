//! Category document.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A category document in the `categories` collection.
///
/// `name` carries a unique index. Deleting a category does not touch
/// products that reference it; the dangling reference is a documented gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}
