//! Authentication service.
//!
//! Username/password login against argon2id hashes.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use cheez_core::Username;

use crate::db::{RepositoryError, UserStore};
use crate::models::{CurrentUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Verified against on an unknown username so that login costs one argon2
/// verification whether or not the account exists.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("cheez-no-such-account").ok());

/// Authentication service.
///
/// Handles login and account creation.
pub struct AuthService<U> {
    users: U,
}

impl<U: UserStore> AuthService<U> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: U) -> Self {
        Self { users }
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        // A malformed username can't match an account
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.credentials_by_username(&username).await?
        else {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            tracing::warn!(username = %username, "login failed: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = verify_password(password, &password_hash) {
            tracing::warn!(username = %username, "login failed: wrong password");
            return Err(e);
        }

        tracing::info!(user_id = %user.id, username = %user.username, "login succeeded");
        Ok(user)
    }

    /// Reload the account behind a session.
    ///
    /// Returns `None` if the account no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub async fn current_user(&self, session: &CurrentUser) -> Result<Option<User>, AuthError> {
        Ok(self.users.by_id(session.id).await?)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;

        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &password_hash, is_admin)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, is_admin, "user created");
        Ok(user)
    }
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
