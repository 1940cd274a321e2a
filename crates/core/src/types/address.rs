//! Shipping address embedded in users and orders.

use serde::{Deserialize, Serialize};

/// A shipping address.
///
/// Embedded in user documents (saved addresses) and denormalized into each
/// order at placement time, so editing a saved address never rewrites
/// historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Validate that the required fields are non-empty.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing field.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("address field '{name}' cannot be empty"));
            }
        }

        Ok(())
    }
}
