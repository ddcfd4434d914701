//! Employee API

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::diff::{create_delete_details, create_diff, create_snapshot};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{ActivityAction, Employee, EmployeeCreate, EmployeeUpdate, RecordStatus};
use shared::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_non_negative,
    validate_optional_text, validate_percentage, validate_required_text,
};

use super::{ApiResult, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list).post(create))
        .route("/api/employees/{id}", get(get_by_id).put(update).delete(delete))
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    pub search: Option<String>,
    pub branch_id: Option<String>,
    pub status: Option<RecordStatus>,
}

fn validate_create(payload: &EmployeeCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    if !payload.email.trim().is_empty() {
        validate_email(&payload.email, "email")?;
    }
    validate_optional_text(&Some(payload.position.clone()), "position", MAX_SHORT_TEXT_LEN)?;
    validate_non_negative(payload.salary, "salary")?;
    validate_percentage(payload.commission_rate, "commissionRate")?;
    validate_non_negative(payload.allowance, "allowance")?;
    Ok(())
}

fn validate_update(payload: &EmployeeUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(email) = payload.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email, "email")?;
    }
    validate_optional_text(&payload.position, "position", MAX_SHORT_TEXT_LEN)?;
    if let Some(salary) = payload.salary {
        validate_non_negative(salary, "salary")?;
    }
    if let Some(rate) = payload.commission_rate {
        validate_percentage(rate, "commissionRate")?;
    }
    if let Some(allowance) = payload.allowance {
        validate_non_negative(allowance, "allowance")?;
    }
    Ok(())
}

pub(crate) async fn load(state: &AppState, id: &str) -> AppResult<Employee> {
    db::employees::get(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::EmployeeNotFound, id))
}

async fn ensure_branch(state: &AppState, branch_id: Option<&str>) -> AppResult<()> {
    if let Some(branch_id) = branch_id.filter(|b| !b.is_empty())
        && db::branches::get(state.db.as_ref(), branch_id).await?.is_none()
    {
        return Err(AppError::missing(ErrorCode::BranchNotFound, branch_id));
    }
    Ok(())
}

/// GET /api/employees
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> ApiResult<Vec<Employee>> {
    let employees = db::employees::list(state.db.as_ref()).await?;
    Ok(Json(db::employees::filter(
        employees,
        query.search.as_deref(),
        query.branch_id.as_deref(),
        query.status,
    )))
}

/// GET /api/employees/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Employee> {
    Ok(Json(load(&state, &id).await?))
}

/// POST /api/employees
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Json(payload): Json<EmployeeCreate>,
) -> ApiResult<Employee> {
    validate_create(&payload)?;
    ensure_branch(&state, payload.branch_id.as_deref()).await?;
    let employee = db::employees::create(state.db.as_ref(), &payload).await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::EmployeeCreated,
        Some(&employee.id),
        Some(create_snapshot(&employee, &[])),
    )
    .await;

    Ok(Json(employee))
}

/// PUT /api/employees/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<EmployeeUpdate>,
) -> ApiResult<Employee> {
    validate_update(&payload)?;
    ensure_branch(&state, payload.branch_id.as_deref()).await?;
    let before = load(&state, &id).await?;
    let employee = db::employees::update(state.db.as_ref(), &id, &payload)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::EmployeeNotFound, id.clone()))?;

    record_activity(
        &state,
        &identity,
        ActivityAction::EmployeeUpdated,
        Some(&id),
        Some(create_diff(&before, &employee, &[])),
    )
    .await;

    Ok(Json(employee))
}

/// DELETE /api/employees/{id} - salary history is kept
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let employee = load(&state, &id).await?;
    let deleted = db::employees::delete(state.db.as_ref(), &id).await?;
    if deleted {
        record_activity(
            &state,
            &identity,
            ActivityAction::EmployeeDeleted,
            Some(&id),
            Some(create_delete_details(&employee.name)),
        )
        .await;
    }
    Ok(ApiResponse::ok_with_message("Employee deleted"))
}
