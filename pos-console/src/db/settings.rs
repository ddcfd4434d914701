//! Store settings, a single object at `settings`

use serde_json::Value;
use shared::models::{Settings, SettingsUpdate};

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "settings";

/// Stored settings over defaults; a missing or malformed object yields defaults
pub async fn get(db: &dyn RealtimeDb) -> ServiceResult<Settings> {
    let value = db.get(PATH).await?;
    let settings = match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Malformed settings, using defaults");
            Settings::default()
        }),
        _ => Settings::default(),
    };
    Ok(settings)
}

pub async fn update(db: &dyn RealtimeDb, data: &SettingsUpdate) -> ServiceResult<Settings> {
    let mut fields = super::to_fields(data)?;
    fields.insert("updatedAt".into(), Value::from(shared::util::now_millis()));
    db.update(PATH, fields).await?;
    get(db).await
}
