//! Payroll API: preview, record and list monthly salaries

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{ActivityAction, Employee, PayrollRequest, SalaryRecord};
use shared::payroll::{self, PayrollInput, SalaryBreakdown};
use shared::validation::{MAX_NOTE_LEN, validate_optional_text};

use super::{ApiResult, employees, record_activity};
use crate::auth::ConsoleIdentity;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees/{id}/payroll/preview", post(preview))
        .route(
            "/api/employees/{id}/salaries",
            get(list_for_employee).post(record),
        )
        .route("/api/salaries", get(list_for_period))
        .route("/api/salaries/{id}", delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub month: u32,
    pub year: i32,
}

fn validate_request(payload: &PayrollRequest) -> AppResult<()> {
    payroll::validate_period(payload.month, payload.year)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    Ok(())
}

/// Fill the request's gaps from the employee record and the month's invoices.
///
/// Sales default to the employee's non-void invoice totals in the pay period, allowance
/// to the standing allowance, deduction to zero.
async fn resolve_input(
    state: &AppState,
    employee: &Employee,
    payload: &PayrollRequest,
) -> AppResult<PayrollInput> {
    let sales_amount = match payload.sales_amount {
        Some(amount) => amount,
        None => {
            let (from, to) = payroll::period_bounds(payload.month, payload.year)?;
            let invoices = db::invoices::list_for_employee(state.db.as_ref(), &employee.id).await?;
            let in_period: Vec<_> = invoices
                .into_iter()
                .filter(|inv| inv.timestamp >= from && inv.timestamp < to)
                .collect();
            db::invoices::sales_total(&in_period)
        }
    };

    Ok(PayrollInput {
        base_salary: employee.salary,
        sales_amount,
        commission_rate: employee.commission_rate,
        allowance: payload.allowance.unwrap_or(employee.allowance),
        deduction: payload.deduction.unwrap_or(0.0),
    })
}

/// POST /api/employees/{id}/payroll/preview - compute without storing
pub async fn preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PayrollRequest>,
) -> ApiResult<SalaryBreakdown> {
    validate_request(&payload)?;
    let employee = employees::load(&state, &id).await?;
    let input = resolve_input(&state, &employee, &payload).await?;
    Ok(Json(payroll::compute(&input)?))
}

/// POST /api/employees/{id}/salaries - compute and store one month
pub async fn record(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<PayrollRequest>,
) -> ApiResult<SalaryRecord> {
    validate_request(&payload)?;
    let employee = employees::load(&state, &id).await?;
    let input = resolve_input(&state, &employee, &payload).await?;
    let pay = payroll::compute(&input)?;

    let salary = SalaryRecord {
        id: String::new(),
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        month: payload.month,
        year: payload.year,
        base_salary: pay.base_salary,
        sales_amount: pay.sales_amount,
        commission_rate: pay.commission_rate,
        commission: pay.commission,
        allowance: pay.allowance,
        deduction: pay.deduction,
        net_salary: pay.net_salary,
        note: payload.note.filter(|n| !n.trim().is_empty()),
        created_at: 0,
        created_by: identity.username.clone(),
    };
    let salary = db::salaries::create(state.db.as_ref(), salary).await?;

    tracing::info!(
        employee_id = %salary.employee_id,
        month = salary.month,
        year = salary.year,
        net_salary = salary.net_salary,
        "Salary recorded"
    );
    record_activity(
        &state,
        &identity,
        ActivityAction::SalaryRecorded,
        Some(&salary.id),
        Some(json!({
            "employee": salary.employee_name,
            "period": format!("{}-{:02}", salary.year, salary.month),
            "netSalary": salary.net_salary,
        })),
    )
    .await;

    Ok(Json(salary))
}

/// GET /api/employees/{id}/salaries - newest period first
pub async fn list_for_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<SalaryRecord>> {
    employees::load(&state, &id).await?;
    Ok(Json(
        db::salaries::list_for_employee(state.db.as_ref(), &id).await?,
    ))
}

/// GET /api/salaries?month=&year=
pub async fn list_for_period(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Vec<SalaryRecord>> {
    payroll::validate_period(query.month, query.year)?;
    Ok(Json(
        db::salaries::list_for_period(state.db.as_ref(), query.month, query.year).await?,
    ))
}

/// DELETE /api/salaries/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<ConsoleIdentity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let salary = db::salaries::get(state.db.as_ref(), &id)
        .await?
        .ok_or_else(|| AppError::missing(ErrorCode::SalaryNotFound, id.clone()))?;
    let deleted = db::salaries::delete(state.db.as_ref(), &id).await?;
    if deleted {
        record_activity(
            &state,
            &identity,
            ActivityAction::SalaryDeleted,
            Some(&id),
            Some(json!({
                "employee": salary.employee_name,
                "period": format!("{}-{:02}", salary.year, salary.month),
            })),
        )
        .await;
    }
    Ok(ApiResponse::ok_with_message("Salary record deleted"))
}
