//! Store settings API

use axum::{
    Extension, Json, Router,
    extract::State,
    routing::{get, put},
};
use shared::diff::create_diff;
use shared::error::AppResult;
use shared::models::{ActivityAction, Settings, SettingsUpdate};
use shared::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_percentage,
    validate_required_text,
};

use super::{ApiResult, admin_only, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/settings", get(get_settings))
        .merge(admin_only(Router::new().route("/api/settings", put(update))))
}

fn validate_update(payload: &SettingsUpdate) -> AppResult<()> {
    if let Some(name) = &payload.store_name {
        validate_required_text(name, "storeName", MAX_NAME_LEN)?;
    }
    if let Some(currency) = &payload.currency {
        validate_required_text(currency, "currency", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.currency_symbol, "currencySymbol", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.receipt_footer, "receiptFooter", MAX_NOTE_LEN)?;
    if let Some(rate) = payload.tax_rate {
        validate_percentage(rate, "taxRate")?;
    }
    if payload.low_stock_threshold.is_some_and(|t| t < 0) {
        return Err(shared::error::AppError::validation(
            "lowStockThreshold must not be negative",
        )
        .with_detail("field", "lowStockThreshold"));
    }
    Ok(())
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Settings> {
    Ok(Json(db::settings::get(state.db.as_ref()).await?))
}

/// PUT /api/settings
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Json(payload): Json<SettingsUpdate>,
) -> ApiResult<Settings> {
    validate_update(&payload)?;
    let before = db::settings::get(state.db.as_ref()).await?;
    let settings = db::settings::update(state.db.as_ref(), &payload).await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::SettingsUpdated,
        None,
        Some(create_diff(&before, &settings, &[])),
    )
    .await;

    Ok(Json(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_update() {
        assert!(validate_update(&SettingsUpdate::default()).is_ok());
        let bad_rate = SettingsUpdate {
            tax_rate: Some(101.0),
            ..Default::default()
        };
        assert!(validate_update(&bad_rate).is_err());
        let blank_name = SettingsUpdate {
            store_name: Some("".into()),
            ..Default::default()
        };
        assert!(validate_update(&blank_name).is_err());
    }
}
