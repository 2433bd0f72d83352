//! User management commands.

use cheez_storefront::db::UserRepository;
use cheez_storefront::services::AuthService;

use super::{CommandError, connect};

/// Create a user with an argon2-hashed password.
///
/// # Errors
///
/// Returns an error if the username or password is rejected, the username is
/// taken, or the database is unreachable.
pub async fn create(username: &str, password: &str, is_admin: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let auth = AuthService::new(UserRepository::new(&pool));

    let user = auth.register(username, password, is_admin).await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Admin: {}",
        user.id,
        user.username,
        user.is_admin
    );
    Ok(())
}
