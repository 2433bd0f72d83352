//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use super::extract::ApiJson;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireUser, clear_current_user, set_current_user};
use crate::models::{CurrentUser, UserSummary, session_keys};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<UserSummary>> {
    let user = state.auth().login(&body.username, &body.password).await?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, user.username.as_str());

    Ok(Json(UserSummary::from(&user)))
}

/// `POST /api/auth/logout`
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// `GET /api/auth/me`
///
/// Reloads the account so a changed admin flag or a deleted user is
/// reflected in the session.
pub async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireUser(current): RequireUser,
) -> Result<Json<UserSummary>> {
    let Some(user) = state.auth().current_user(&current).await? else {
        clear_current_user(&session).await?;
        return Err(AppError::Unauthorized("Not authenticated".to_owned()));
    };

    let fresh = CurrentUser::from(&user);
    if fresh != current {
        session.insert(session_keys::CURRENT_USER, &fresh).await?;
    }

    Ok(Json(UserSummary::from(&user)))
}
