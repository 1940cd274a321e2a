//! User document and its public projection.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::{Address, Email, Role};

/// A user document in the `users` collection.
///
/// `email` carries a unique index (created by `db::ensure_indexes`). The
/// password is stored only as an argon2 hash; handlers must respond with
/// [`UserProfile`], never with this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    /// Product references saved for later.
    #[serde(default)]
    pub wishlist: Vec<ObjectId>,
    /// Saved shipping addresses, addressed by position.
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Project into the shape safe to return to clients.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            wishlist: self.wishlist.iter().map(|id| id.to_hex()).collect(),
            addresses: self.addresses.clone(),
            created_at: self.created_at,
        }
    }

    /// Whether this user may access admin routes.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Public projection of a [`User`]: no password hash, hex-string ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub wishlist: Vec<String>,
    pub addresses: Vec<Address>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Some(ObjectId::new()),
            name: "Asha Rao".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$hash".to_string(),
            role: Role::User,
            wishlist: vec![ObjectId::new()],
            addresses: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_never_contains_password_hash() {
        let user = sample_user();
        let profile = user.profile();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_profile_hex_ids() {
        let user = sample_user();
        let profile = user.profile();
        assert_eq!(profile.id, user.id.unwrap().to_hex());
        assert_eq!(profile.wishlist.len(), 1);
    }

    #[test]
    fn test_is_admin() {
        let mut user = sample_user();
        assert!(!user.is_admin());
        user.role = Role::Admin;
        assert!(user.is_admin());
    }
}
