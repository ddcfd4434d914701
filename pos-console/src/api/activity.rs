//! Activity log API

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use shared::error::{AppError, ApiResponse};
use shared::models::{ActivityAction, ActivityLog, ActivityType};

use super::{ApiResult, admin_only, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::db::activity::ActivityFilter;
use crate::state::AppState;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/activity", get(list))
        .merge(admin_only(
            Router::new().route("/api/activity", axum::routing::delete(clear)),
        ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    #[serde(rename = "type")]
    pub kind: Option<ActivityType>,
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    pub older_than_days: u32,
}

/// GET /api/activity - newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Vec<ActivityLog>> {
    let filter = ActivityFilter {
        kind: query.kind,
        user_id: query.user_id,
        limit: query.limit,
    };
    Ok(Json(db::activity::list(state.db.as_ref(), &filter).await?))
}

/// DELETE /api/activity?older_than_days=N
pub async fn clear(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Query(query): Query<ClearQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let cutoff = shared::util::now_millis() - i64::from(query.older_than_days) * DAY_MILLIS;
    let removed = db::activity::clear_before(state.db.as_ref(), cutoff).await?;

    tracing::info!(removed, older_than_days = query.older_than_days, "Activity log cleared");
    record_activity(
        &state,
        &identity,
        ActivityAction::ActivityCleared,
        None,
        Some(json!({"olderThanDays": query.older_than_days, "removed": removed})),
    )
    .await;

    Ok(ApiResponse::ok_with_message(format!("Removed {removed} entries")))
}
