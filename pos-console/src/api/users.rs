//! Console user management (admin only)

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::Deserialize;
use shared::diff::{create_delete_details, create_diff, create_snapshot};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{
    ActivityAction, RecordStatus, User, UserCreate, UserRole, UserStatusUpdate, UserUpdate,
};
use shared::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_password, validate_required_text,
};

use super::{ApiResult, admin_only, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::db::users::UserFilter;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    admin_only(
        Router::new()
            .route("/api/users", get(list).post(create))
            .route("/api/users/{id}", get(get_by_id).put(update).delete(delete))
            .route("/api/users/{id}/status", put(set_status)),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub status: Option<RecordStatus>,
    pub search: Option<String>,
}

fn validate_create(payload: &UserCreate) -> AppResult<()> {
    validate_required_text(&payload.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.full_name, "fullName", MAX_NAME_LEN)?;
    validate_email(&payload.email, "email")?;
    validate_password(&payload.password)?;
    Ok(())
}

fn validate_update(payload: &UserUpdate) -> AppResult<()> {
    if let Some(username) = &payload.username {
        validate_required_text(username, "username", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(full_name) = &payload.full_name {
        validate_required_text(full_name, "fullName", MAX_NAME_LEN)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email, "email")?;
    }
    Ok(())
}

async fn load(state: &AppState, id: &str) -> AppResult<User> {
    db::users::get(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::UserNotFound, id))
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Vec<User>> {
    let users = db::users::list(state.db.as_ref()).await?;
    let filter = UserFilter {
        role: query.role,
        status: query.status,
        search: query.search,
    };
    Ok(Json(db::users::filter(users, &filter)))
}

/// GET /api/users/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    Ok(Json(load(&state, &id).await?))
}

/// POST /api/users - registers the identity account, then the profile at `users/{uid}`
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Json(payload): Json<UserCreate>,
) -> ApiResult<User> {
    validate_create(&payload)?;

    // Checked before the identity account exists so a taken username leaves nothing behind
    if db::users::find_by_username(state.db.as_ref(), payload.username.trim())
        .await?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::UsernameExists)
            .with_detail("username", payload.username.trim()));
    }

    let email = payload.email.trim().to_lowercase();
    let uid = state
        .identity
        .create_account(&email, &payload.password)
        .await
        .map_err(|e| {
            tracing::error!(email = %email, error = %e, "Failed to create identity account");
            AppError::from(e)
        })?;

    let user = db::users::create(state.db.as_ref(), &uid, &payload).await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::UserCreated,
        Some(&user.id),
        Some(create_snapshot(&user, &[])),
    )
    .await;

    Ok(Json(user))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> ApiResult<User> {
    validate_update(&payload)?;
    if id == identity.user_id
        && payload.role.is_some_and(|r| r != identity.role)
    {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }

    let before = load(&state, &id).await?;
    let user = db::users::update(state.db.as_ref(), &id, &payload)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::UserNotFound, id.clone()))?;

    record_activity(
        &state,
        &identity,
        ActivityAction::UserUpdated,
        Some(&id),
        Some(create_diff(&before, &user, &[])),
    )
    .await;

    Ok(Json(user))
}

/// PUT /api/users/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UserStatusUpdate>,
) -> ApiResult<User> {
    if id == identity.user_id && !payload.status.is_active() {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }

    let before = load(&state, &id).await?;
    let user = db::users::set_status(state.db.as_ref(), &id, payload.status)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::UserNotFound, id.clone()))?;

    record_activity(
        &state,
        &identity,
        ActivityAction::UserStatusChanged,
        Some(&id),
        Some(create_diff(&before, &user, &[])),
    )
    .await;

    Ok(Json(user))
}

/// DELETE /api/users/{id}
///
/// Removes the console profile; the identity account stays with the hosted service.
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    if id == identity.user_id {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }

    let user = load(&state, &id).await?;
    let deleted = db::users::delete(state.db.as_ref(), &id).await?;
    if deleted {
        record_activity(
            &state,
            &identity,
            ActivityAction::UserDeleted,
            Some(&id),
            Some(create_delete_details(&user.username)),
        )
        .await;
    }
    Ok(ApiResponse::ok_with_message("User deleted"))
}
