//! Store settings singleton document.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// The singleton document in the `settings` collection.
///
/// Exactly one document is expected; it is created lazily with these
/// defaults on first read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub support_email: String,
    #[serde(default)]
    pub support_phone: String,
    #[serde(default)]
    pub address: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            id: None,
            store_name: "Marigold".to_string(),
            logo: None,
            support_email: String::new(),
            support_phone: String::new(),
            address: String::new(),
        }
    }
}
