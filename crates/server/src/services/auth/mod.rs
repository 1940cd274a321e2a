//! Authentication service.
//!
//! Register/login hash and compare passwords with argon2, and issue signed
//! HS256 bearer tokens. Token validation only proves the signature; the auth
//! middleware re-fetches the user document on every request, so a deleted or
//! demoted user loses access immediately.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use bson::oid::ObjectId;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use mongodb::Database;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use marigold_core::Email;

use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Claims carried in a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id, hex-encoded.
    pub sub: String,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
}

/// HS256 key pair plus token lifetime, built once at startup.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl TokenKeys {
    /// Build keys from the configured secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_hours,
        }
    }

    /// Sign a token for a user id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if encoding fails (never in
    /// practice with an HS256 key).
    pub fn issue(&self, user_id: ObjectId) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_hex(),
            exp: (now + chrono::Duration::hours(self.ttl_hours)).timestamp(),
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Decode and validate a token, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` on bad signature or expiry.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &Validation::default())
                .map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims)
    }
}

/// Authentication service.
///
/// Handles user registration, login, and token issuance.
pub struct AuthService<'a> {
    users: UserRepository,
    keys: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(db: &Database, keys: &'a TokenKeys) -> Self {
        Self {
            users: UserRepository::new(db),
            keys,
        }
    }

    /// Register a new user and issue their first token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let now = Utc::now();
        let mut user = User {
            id: None,
            name: name.trim().to_owned(),
            email,
            password_hash,
            role: marigold_core::Role::User,
            wishlist: Vec::new(),
            addresses: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let id = self.users.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;
        user.id = Some(id);

        let token = self.keys.issue(id)?;
        Ok((user, token))
    }

    /// Login with email and password, issuing a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let id = user
            .id
            .ok_or_else(|| RepositoryError::DataCorruption("user without _id".to_owned()))?;
        let token = self.keys.issue(id)?;
        Ok((user, token))
    }
}

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Hash a password with argon2 and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if the hasher fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch, and
/// `AuthError::Hashing` if the stored hash is unparseable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password!", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345678").is_ok());
        assert!(matches!(
            validate_password("1234567"),
            Err(AuthError::WeakPassword { min: 8 })
        ));
    }

    #[test]
    fn test_token_round_trip() {
        let secret = SecretString::from("kX9#mQ2$vL8@nR4^wT6&zF1*yB3!pC7%");
        let keys = TokenKeys::new(&secret, 24);
        let user_id = ObjectId::new();

        let token = keys.issue(user_id).unwrap();
        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_hex());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_wrong_key_rejected() {
        let keys = TokenKeys::new(&SecretString::from("kX9#mQ2$vL8@nR4^wT6&zF1*yB3!pC7%"), 24);
        let other = TokenKeys::new(&SecretString::from("aJ5!dH8@fK2#gM6$hP9%jR3^kT7&lW1*"), 24);

        let token = keys.issue(ObjectId::new()).unwrap();
        assert!(matches!(other.decode(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let keys = TokenKeys::new(&SecretString::from("kX9#mQ2$vL8@nR4^wT6&zF1*yB3!pC7%"), 24);
        assert!(matches!(
            keys.decode("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
