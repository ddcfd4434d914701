//! Backup API (admin only)

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{
    ActivityAction, BackupCreate, BackupKind, BackupRecord, RestoreReport, RestoreRequest,
};
use shared::validation::{MAX_NAME_LEN, validate_required_text};

use super::{ApiResult, admin_only, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    admin_only(
        Router::new()
            .route("/api/backups", get(list).post(create))
            .route("/api/backups/{id}", delete(remove))
            .route("/api/backups/{id}/restore", post(restore))
            .route("/api/backups/{id}/download", get(download)),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct BackupQuery {
    #[serde(rename = "type")]
    pub kind: Option<BackupKind>,
}

fn validate_create(payload: &BackupCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    if payload.selection.is_empty() {
        return Err(AppError::new(ErrorCode::BackupEmptySelection));
    }
    Ok(())
}

/// GET /api/backups - newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BackupQuery>,
) -> ApiResult<Vec<BackupRecord>> {
    let backups = match query.kind {
        Some(kind) => db::backups::list_kind(state.db.as_ref(), kind).await?,
        None => db::backups::list(state.db.as_ref()).await?,
    };
    Ok(Json(backups))
}

/// POST /api/backups
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Json(payload): Json<BackupCreate>,
) -> ApiResult<BackupRecord> {
    validate_create(&payload)?;
    let record = state
        .backups
        .create(
            &payload.name,
            &payload.selection,
            &identity.username,
            BackupKind::Manual,
        )
        .await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::BackupCreated,
        Some(&record.id),
        Some(json!({
            "name": record.name,
            "size": record.size,
            "categories": record.categories,
        })),
    )
    .await;

    Ok(Json(record))
}

/// POST /api/backups/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<RestoreRequest>,
) -> ApiResult<RestoreReport> {
    let report = state.backups.restore(&id, &payload.selection).await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::BackupRestored,
        Some(&id),
        Some(json!({
            "restored": report.restored,
            "skipped": report.skipped,
        })),
    )
    .await;

    Ok(Json(report))
}

/// GET /api/backups/{id}/download - the raw backup file
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let file = state.backups.download(&id).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// DELETE /api/backups/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let record = state.backups.delete(&id).await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::BackupDeleted,
        Some(&id),
        Some(json!({"name": record.name})),
    )
    .await;

    Ok(ApiResponse::ok_with_message("Backup deleted"))
}
