//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cheez_core::{UserId, Username};

/// A site account.
///
/// The password hash is never part of this type; it is only loaded by
/// [`crate::db::UserStore::credentials_by_username`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// The public view of a user returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_str().to_owned(),
            is_admin: user.is_admin,
        }
    }
}
