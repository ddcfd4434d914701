//! Console sign-in

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{ActivityAction, User};

use super::ApiResult;
use crate::auth::{ConsoleIdentity, create_token};
use crate::db;
use crate::db::activity::Actor;
use crate::security_log;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::invalid_credentials());
    }

    let session = state
        .identity
        .sign_in(&email, &req.password)
        .await
        .map_err(|e| {
            security_log!(WARN, "login_failed", email = %email, reason = %e);
            AppError::from(e)
        })?;

    let user = db::users::get(state.db.as_ref(), &session.uid)
        .await?
        .ok_or_else(|| {
            security_log!(WARN, "login_without_profile", uid = %session.uid);
            AppError::invalid_credentials()
        })?;

    if !user.status.is_active() {
        security_log!(WARN, "login_disabled_account", uid = %user.id, username = %user.username);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    if !user.role.can_use_console() {
        security_log!(WARN, "login_role_denied", uid = %user.id, role = user.role.as_str());
        return Err(AppError::permission_denied("This role cannot use the admin console"));
    }

    let token = create_token(&user.id, &user.username, user.role, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let now = shared::util::now_millis();
    if let Err(e) = db::users::touch_last_login(state.db.as_ref(), &user.id, now).await {
        tracing::warn!(uid = %user.id, error = %e, "Failed to update last login");
    }
    let actor = Actor {
        user_id: &user.id,
        username: &user.username,
    };
    if let Err(e) =
        db::activity::record(state.db.as_ref(), &actor, ActivityAction::Login, None, None).await
    {
        tracing::warn!(error = %e, "Failed to record login activity");
    }
    security_log!(INFO, "login_success", uid = %user.id, username = %user.username);

    Ok(Json(LoginResponse {
        token,
        user: User {
            last_login: Some(now),
            ..user
        },
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
) -> ApiResult<User> {
    let user = db::users::get(state.db.as_ref(), &identity.user_id)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::UserNotFound, identity.user_id.clone()))?;
    Ok(Json(user))
}
