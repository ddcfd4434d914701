//! Inventory API

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use shared::diff::{create_delete_details, create_diff, create_snapshot};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{
    ActivityAction, Product, ProductCreate, ProductUpdate, StockAdjustment,
};
use shared::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative,
    validate_optional_text, validate_required_text,
};

use super::{ApiResult, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/low-stock", get(low_stock))
        .route("/api/products/{id}", get(get_by_id).put(update).delete(delete))
        .route("/api/products/{id}/stock", post(adjust_stock))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

fn validate_count(value: i64, field: &str) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::validation(format!("{field} must not be negative"))
            .with_detail("field", field));
    }
    Ok(())
}

fn validate_create(payload: &ProductCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&Some(payload.sku.clone()), "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&Some(payload.category.clone()), "category", MAX_NAME_LEN)?;
    validate_optional_text(&Some(payload.unit.clone()), "unit", MAX_SHORT_TEXT_LEN)?;
    validate_non_negative(payload.price, "price")?;
    validate_non_negative(payload.cost, "cost")?;
    validate_count(payload.stock, "stock")?;
    validate_count(payload.min_stock, "minStock")?;
    Ok(())
}

fn validate_update(payload: &ProductUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&payload.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    if let Some(price) = payload.price {
        validate_non_negative(price, "price")?;
    }
    if let Some(cost) = payload.cost {
        validate_non_negative(cost, "cost")?;
    }
    if let Some(stock) = payload.stock {
        validate_count(stock, "stock")?;
    }
    if let Some(min_stock) = payload.min_stock {
        validate_count(min_stock, "minStock")?;
    }
    Ok(())
}

async fn load(state: &AppState, id: &str) -> AppResult<Product> {
    db::products::get(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::ProductNotFound, id))
}

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Vec<Product>> {
    let products = db::products::list(state.db.as_ref()).await?;
    Ok(Json(db::products::filter(
        products,
        query.search.as_deref(),
        query.category.as_deref(),
    )))
}

/// GET /api/products/low-stock
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    Ok(Json(db::products::low_stock(state.db.as_ref()).await?))
}

/// GET /api/products/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    Ok(Json(load(&state, &id).await?))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Json(payload): Json<ProductCreate>,
) -> ApiResult<Product> {
    validate_create(&payload)?;
    let product = db::products::create(state.db.as_ref(), &payload).await?;

    record_activity(
        &state,
        &identity,
        ActivityAction::ProductCreated,
        Some(&product.id),
        Some(create_snapshot(&product, &[])),
    )
    .await;

    Ok(Json(product))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> ApiResult<Product> {
    validate_update(&payload)?;
    let before = load(&state, &id).await?;
    let product = db::products::update(state.db.as_ref(), &id, &payload)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::ProductNotFound, id.clone()))?;

    record_activity(
        &state,
        &identity,
        ActivityAction::ProductUpdated,
        Some(&id),
        Some(create_diff(&before, &product, &[])),
    )
    .await;

    Ok(Json(product))
}

/// POST /api/products/{id}/stock - add or remove units
pub async fn adjust_stock(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustment>,
) -> ApiResult<Product> {
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    if payload.delta == 0 {
        return Err(AppError::validation("delta must not be zero").with_detail("field", "delta"));
    }
    let product = db::products::adjust_stock(state.db.as_ref(), &id, payload.delta)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::ProductNotFound, id.clone()))?;

    record_activity(
        &state,
        &identity,
        ActivityAction::StockAdjusted,
        Some(&id),
        Some(json!({
            "name": product.name,
            "delta": payload.delta,
            "stock": product.stock,
            "reason": payload.reason,
        })),
    )
    .await;

    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let product = load(&state, &id).await?;
    let deleted = db::products::delete(state.db.as_ref(), &id).await?;
    if deleted {
        record_activity(
            &state,
            &identity,
            ActivityAction::ProductDeleted,
            Some(&id),
            Some(create_delete_details(&product.name)),
        )
        .await;
    }
    Ok(ApiResponse::ok_with_message("Product deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ProductCreate {
        ProductCreate {
            name: "Green tea".into(),
            sku: "TEA-01".into(),
            category: "Drinks".into(),
            price: 2.5,
            cost: 1.0,
            stock: 40,
            min_stock: 5,
            unit: "cup".into(),
        }
    }

    #[test]
    fn test_validate_create() {
        assert!(validate_create(&payload()).is_ok());
        assert!(validate_create(&ProductCreate { price: -0.5, ..payload() }).is_err());
        assert!(validate_create(&ProductCreate { stock: -1, ..payload() }).is_err());
        assert!(validate_create(&ProductCreate { name: " ".into(), ..payload() }).is_err());
    }

    #[test]
    fn test_validate_update() {
        assert!(validate_update(&ProductUpdate::default()).is_ok());
        let update = ProductUpdate {
            price: Some(f64::INFINITY),
            ..Default::default()
        };
        assert_eq!(
            validate_update(&update).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }
}
