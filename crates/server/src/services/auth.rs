//! Tenant authentication: password registration/login and JWT session
//! tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use storepulse_core::{Email, TenantId};

use crate::db::{RepositoryError, TenantRepository};
use crate::models::Tenant;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] storepulse_core::EmailError),

    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email or store name already registered.
    #[error("account already exists")]
    TenantAlreadyExists,

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Session token missing, malformed, or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// JWT claims: the tenant id as subject plus expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
}

/// Authentication service over the tenant repository.
pub struct AuthService<'a> {
    tenants: TenantRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            tenants: TenantRepository::new(pool),
        }
    }

    /// Register a new tenant account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email,
    /// `AuthError::WeakPassword` for a short password, and
    /// `AuthError::TenantAlreadyExists` if the email or store name is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        store_name: &str,
        store_access_token: Option<&str>,
    ) -> Result<Tenant, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let tenant = self
            .tenants
            .create(&email, &password_hash, store_name, store_access_token)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::TenantAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(tenant)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on a wrong password or an
    /// unknown email, without distinguishing the two.
    pub async fn login(&self, email: &str, password: &str) -> Result<Tenant, AuthError> {
        let email = Email::parse(email)?;
        let (tenant, password_hash) = self
            .tenants
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;
        Ok(tenant)
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

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Issue a signed session token for a tenant.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if signing fails.
pub fn issue_token(
    tenant_id: TenantId,
    secret: &SecretString,
    expiry_hours: i64,
) -> Result<String, AuthError> {
    let claims = Claims {
        sub: tenant_id.as_uuid(),
        exp: (Utc::now() + Duration::hours(expiry_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Verify a session token and extract the tenant id.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` for a bad signature, malformed token,
/// or expired claims.
pub fn verify_token(token: &str, secret: &SecretString) -> Result<TenantId, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;
    Ok(TenantId::from_uuid(data.claims.sub))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("a-test-secret-at-least-32-chars-long!")
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2"));
        verify_password("correct horse battery staple", &hash).unwrap();
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_passwords_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        validate_password("longenough").unwrap();
    }

    #[test]
    fn test_token_round_trip() {
        let tenant_id = TenantId::new();
        let token = issue_token(tenant_id, &secret(), 24).unwrap();
        assert_eq!(verify_token(&token, &secret()).unwrap(), tenant_id);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token(TenantId::new(), &secret(), 24).unwrap();
        let other = SecretString::from("another-secret-also-32-chars-long!!!");
        assert!(matches!(
            verify_token(&token, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(TenantId::new(), &secret(), -1).unwrap();
        assert!(matches!(
            verify_token(&token, &secret()),
            Err(AuthError::InvalidToken)
        ));
    }
}
