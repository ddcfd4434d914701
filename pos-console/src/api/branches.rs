//! Branch API

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::diff::{create_delete_details, create_diff, create_snapshot};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{ActivityAction, Branch, BranchCreate, BranchUpdate, Employee};
use shared::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};

use super::{ApiResult, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/branches", get(list).post(create))
        .route("/api/branches/{id}", get(get_by_id).put(update).delete(delete))
        .route("/api/branches/{id}/employees", get(employees))
}

#[derive(Debug, Default, Deserialize)]
pub struct BranchQuery {
    pub search: Option<String>,
}

fn validate_create(payload: &BranchCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&Some(payload.address.clone()), "address", MAX_NOTE_LEN)?;
    validate_optional_text(&Some(payload.phone.clone()), "phone", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

fn validate_update(payload: &BranchUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.address, "address", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

async fn load(state: &AppState, id: &str) -> AppResult<Branch> {
    db::branches::get(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::BranchNotFound, id))
}

/// GET /api/branches
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BranchQuery>,
) -> ApiResult<Vec<Branch>> {
    let mut branches = db::branches::list(state.db.as_ref()).await?;
    if let Some(q) = query.search.as_deref() {
        branches.retain(|b| db::matches_search(q, &[&b.name, &b.address, &b.phone]));
    }
    Ok(Json(branches))
}

/// GET /api/branches/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Branch> {
    Ok(Json(load(&state, &id).await?))
}

/// GET /api/branches/{id}/employees
pub async fn employees(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Employee>> {
    load(&state, &id).await?;
    Ok(Json(db::employees::list_by_branch(state.db.as_ref(), &id).await?))
}

/// POST /api/branches
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Json(payload): Json<BranchCreate>,
) -> ApiResult<Branch> {
    validate_create(&payload)?;
    let branch = db::branches::create(state.db.as_ref(), &payload).await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::BranchCreated,
        Some(&branch.id),
        Some(create_snapshot(&branch, &[])),
    )
    .await;

    Ok(Json(branch))
}

/// PUT /api/branches/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<BranchUpdate>,
) -> ApiResult<Branch> {
    validate_update(&payload)?;
    let before = load(&state, &id).await?;
    let branch = db::branches::update(state.db.as_ref(), &id, &payload)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::BranchNotFound, id.clone()))?;

    record_activity(
        &state,
        &identity,
        ActivityAction::BranchUpdated,
        Some(&id),
        Some(create_diff(&before, &branch, &[])),
    )
    .await;

    Ok(Json(branch))
}

/// DELETE /api/branches/{id} - refused while employees are assigned
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let branch = load(&state, &id).await?;
    let deleted = db::branches::delete(state.db.as_ref(), &id).await?;
    if deleted {
        record_activity(
            &state,
            &identity,
            ActivityAction::BranchDeleted,
            Some(&id),
            Some(create_delete_details(&branch.name)),
        )
        .await;
    }
    Ok(ApiResponse::ok_with_message("Branch deleted"))
}
