//! Invoice API (read-only)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::Invoice;

use super::ApiResult;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invoices", get(list))
        .route("/api/invoices/{id}", get(get_by_id))
}

/// Epoch-millis range, `from` inclusive and `to` exclusive
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub customer_id: Option<String>,
    pub employee_id: Option<String>,
}

/// GET /api/invoices
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> ApiResult<Vec<Invoice>> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(AppError::validation("from must not be after to").with_detail("field", "from"));
    }

    let db = state.db.as_ref();
    let from = query.from.unwrap_or(i64::MIN);
    let to = query.to.unwrap_or(i64::MAX);
    let mut invoices = match (&query.customer_id, &query.employee_id) {
        (Some(customer_id), _) => db::invoices::list_for_customer(db, customer_id).await?,
        (None, Some(employee_id)) => db::invoices::list_for_employee(db, employee_id).await?,
        (None, None) => return Ok(Json(db::invoices::list_between(db, from, to).await?)),
    };
    invoices.retain(|inv| inv.timestamp >= from && inv.timestamp < to);
    if let Some(employee_id) = query.employee_id.as_deref() {
        invoices.retain(|inv| inv.employee_id.as_deref() == Some(employee_id));
    }
    Ok(Json(invoices))
}

/// GET /api/invoices/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Invoice> {
    let invoice = db::invoices::get(state.db.as_ref(), &id)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::InvoiceNotFound, id.clone()))?;
    Ok(Json(invoice))
}
