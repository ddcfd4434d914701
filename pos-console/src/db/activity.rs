//! Activity log at `activityLogs/{id}`

use serde_json::{Value, json};
use shared::models::{ActivityAction, ActivityLog, ActivityType};

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "activityLogs";

/// Default and maximum page size of the activity list
pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;

#[derive(Debug, Default, Clone)]
pub struct ActivityFilter {
    pub kind: Option<ActivityType>,
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

/// Who did it
#[derive(Debug, Clone)]
pub struct Actor<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
}

/// Append one entry and return its key
pub async fn record(
    db: &dyn RealtimeDb,
    actor: &Actor<'_>,
    action: ActivityAction,
    target: Option<&str>,
    details: Option<Value>,
) -> ServiceResult<String> {
    let mut entry = json!({
        "userId": actor.user_id,
        "username": actor.username,
        "action": action,
        "type": action.activity_type(),
        "timestamp": shared::util::now_millis(),
    });
    if let Some(target) = target {
        entry["target"] = Value::from(target);
    }
    if let Some(details) = details {
        entry["details"] = details;
    }
    Ok(db.push(PATH, entry).await?)
}

/// Newest first, filtered and truncated
pub async fn list(db: &dyn RealtimeDb, filter: &ActivityFilter) -> ServiceResult<Vec<ActivityLog>> {
    let mut logs: Vec<ActivityLog> = super::list(db, PATH).await?;
    logs.retain(|log| {
        filter.kind.is_none_or(|k| log.kind == k)
            && filter.user_id.as_deref().is_none_or(|u| log.user_id == u)
    });
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    logs.truncate(filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT));
    Ok(logs)
}

/// Remove entries older than `cutoff` (epoch millis); returns how many were removed
pub async fn clear_before(db: &dyn RealtimeDb, cutoff: i64) -> ServiceResult<usize> {
    let logs: Vec<ActivityLog> = super::list(db, PATH).await?;
    let mut fields = serde_json::Map::new();
    for log in logs.iter().filter(|log| log.timestamp < cutoff) {
        fields.insert(log.id.clone(), Value::Null);
    }
    let removed = fields.len();
    // One multi-path write with null values deletes them all
    db.update(PATH, fields).await?;
    Ok(removed)
}
