//! Authentication service.
//!
//! Signup and login with argon2 password hashing, plus opaque access tokens
//! stored server-side with an expiry. Handlers resolve the `X-API-Key`
//! header back to a user through [`AuthService::resolve_token`].

mod error;

pub use error::AuthError;

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sqlx::PgPool;

use pomelo_core::{Email, NationalId};

use crate::db::users::{NewUser, UserRepository};
use crate::models::user::{SignupRequest, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Number of random bytes in an access token.
const TOKEN_BYTES: usize = 32;

/// An issued access token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AccessToken {
    /// Opaque token value, presented in the `X-API-Key` header.
    pub access_token: String,
    /// When the token stops working.
    pub expires_at: DateTime<Utc>,
}

/// Authentication service.
///
/// Handles user registration, login, and token resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    token_ttl: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, token_ttl: Duration) -> Self {
        Self {
            users: UserRepository::new(pool),
            token_ttl,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if the two password fields
    /// differ, `AuthError::WeakPassword`/`InvalidNid`/`InvalidEmail`/
    /// `InvalidPhone` on validation failures, and
    /// `AuthError::UserAlreadyExists` if the nid or phone is taken.
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, AuthError> {
        if request.password != request.re_password {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(&request.password)?;

        let nid = NationalId::parse(&request.nid)?;
        let phone = validate_phone(&request.phone)?;
        let email = request
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()?;

        let password_hash = hash_password(&request.password)?;

        let user = self
            .users
            .create(&NewUser {
                nid: &nid,
                first_name: &request.first_name,
                last_name: &request.last_name,
                phone: &phone,
                email: email.as_ref(),
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with phone and password, issuing a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the phone is unknown or
    /// the password is wrong. The two cases are deliberately not
    /// distinguishable from the outside.
    pub async fn login(&self, phone: &str, password: &str) -> Result<AccessToken, AuthError> {
        let (user, password_hash) = self
            .users
            .get_auth_by_phone(phone.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token();
        let expires_at = Utc::now() + self.token_ttl;
        self.users.create_token(user.id, &token, expires_at).await?;

        Ok(AccessToken {
            access_token: token,
            expires_at,
        })
    }

    /// Resolve an access token to its user, if the token is valid and
    /// unexpired.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn resolve_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.get_by_token(token).await?)
    }
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate and normalize a phone number.
///
/// Accepts an optional leading `+` followed by 7 to 15 digits.
fn validate_phone(phone: &str) -> Result<String, AuthError> {
    let trimmed = phone.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AuthError::InvalidPhone(
            "phone must contain only digits, optionally prefixed with +".to_owned(),
        ));
    }
    if !(7..=15).contains(&digits.len()) {
        return Err(AuthError::InvalidPhone(
            "phone must be 7 to 15 digits".to_owned(),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Hash a password with argon2 and a fresh salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generate an opaque URL-safe access token.
fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trips_through_hash() {
        let hash = hash_password("correct horse battery").expect("hashing succeeds");
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn phone_validation() {
        assert_eq!(validate_phone(" +989121234567 ").unwrap(), "+989121234567");
        assert!(validate_phone("12345678").is_ok());
        assert!(matches!(
            validate_phone("123"),
            Err(AuthError::InvalidPhone(_))
        ));
        assert!(matches!(
            validate_phone("123-456-7890"),
            Err(AuthError::InvalidPhone(_))
        ));
        assert!(matches!(validate_phone(""), Err(AuthError::InvalidPhone(_))));
    }

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
