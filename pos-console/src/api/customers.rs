//! Customer API

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::diff::{create_delete_details, create_diff, create_snapshot};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{ActivityAction, Customer, CustomerCreate, CustomerUpdate, Invoice};
use shared::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_required_text,
};

use super::{ApiResult, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/{id}", get(get_by_id).put(update).delete(delete))
        .route("/api/customers/{id}/invoices", get(invoices))
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
}

fn validate_contact(phone: Option<&str>, email: Option<&str>, address: Option<&str>) -> AppResult<()> {
    validate_optional_text(&phone.map(String::from), "phone", MAX_SHORT_TEXT_LEN)?;
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        validate_email(email, "email")?;
    }
    validate_optional_text(&address.map(String::from), "address", MAX_NOTE_LEN)?;
    Ok(())
}

fn validate_create(payload: &CustomerCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_contact(
        Some(&payload.phone),
        Some(&payload.email),
        Some(&payload.address),
    )?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    Ok(())
}

fn validate_update(payload: &CustomerUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_contact(
        payload.phone.as_deref(),
        payload.email.as_deref(),
        payload.address.as_deref(),
    )?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    if payload.points.is_some_and(|p| p < 0) {
        return Err(AppError::validation("points must not be negative").with_detail("field", "points"));
    }
    Ok(())
}

async fn load(state: &AppState, id: &str) -> AppResult<Customer> {
    db::customers::get(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::CustomerNotFound, id))
}

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Vec<Customer>> {
    let customers = db::customers::list(state.db.as_ref()).await?;
    Ok(Json(db::customers::filter(customers, query.search.as_deref())))
}

/// GET /api/customers/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Customer> {
    Ok(Json(load(&state, &id).await?))
}

/// GET /api/customers/{id}/invoices - purchase history, newest first
pub async fn invoices(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Invoice>> {
    load(&state, &id).await?;
    Ok(Json(
        db::invoices::list_for_customer(state.db.as_ref(), &id).await?,
    ))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Json(payload): Json<CustomerCreate>,
) -> ApiResult<Customer> {
    validate_create(&payload)?;
    let customer = db::customers::create(state.db.as_ref(), &payload).await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::CustomerCreated,
        Some(&customer.id),
        Some(create_snapshot(&customer, &[])),
    )
    .await;

    Ok(Json(customer))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<CustomerUpdate>,
) -> ApiResult<Customer> {
    validate_update(&payload)?;
    let before = load(&state, &id).await?;
    let customer = db::customers::update(state.db.as_ref(), &id, &payload)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::CustomerNotFound, id.clone()))?;

    record_activity(
        &state,
        &identity,
        ActivityAction::CustomerUpdated,
        Some(&id),
        Some(create_diff(&before, &customer, &[])),
    )
    .await;

    Ok(Json(customer))
}

/// DELETE /api/customers/{id} - invoices keep their `customerId`
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let customer = load(&state, &id).await?;
    let deleted = db::customers::delete(state.db.as_ref(), &id).await?;
    if deleted {
        record_activity(
            &state,
            &identity,
            ActivityAction::CustomerDeleted,
            Some(&id),
            Some(create_delete_details(&customer.name)),
        )
        .await;
    }
    Ok(ApiResponse::ok_with_message("Customer deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_create_allows_blank_contact() {
        let payload = CustomerCreate {
            name: "Ana".into(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            note: None,
        };
        assert!(validate_create(&payload).is_ok());
        let bad = CustomerCreate {
            email: "ana-at-mail".into(),
            ..payload
        };
        assert!(validate_create(&bad).is_err());
    }

    #[test]
    fn test_validate_update_rejects_negative_points() {
        let update = CustomerUpdate {
            points: Some(-5),
            ..Default::default()
        };
        assert!(validate_update(&update).is_err());
    }
}
