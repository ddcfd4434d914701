//! Dashboard summary

use axum::{Json, extract::State};
use serde::Serialize;

use super::ApiResult;
use crate::db;
use crate::db::activity::ActivityFilter;
use crate::state::AppState;
use shared::models::{ActivityLog, BackupRecord, Product};

const RECENT_ACTIVITY: usize = 10;
const LOW_STOCK_PREVIEW: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub users: usize,
    pub branches: usize,
    pub employees: usize,
    pub products: usize,
    pub customers: usize,
    pub low_stock_count: usize,
    pub low_stock: Vec<Product>,
    /// Non-void invoices since the start of the current UTC month
    pub month_invoice_count: usize,
    pub month_sales: f64,
    pub last_backup: Option<BackupRecord>,
    pub recent_activity: Vec<ActivityLog>,
}

fn month_start_millis() -> i64 {
    use chrono::Datelike;
    let today = chrono::Utc::now().date_naive();
    today
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// GET /api/dashboard
pub async fn summary(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let db = state.db.as_ref();
    let activity_filter = ActivityFilter {
        limit: Some(RECENT_ACTIVITY),
        ..Default::default()
    };
    let (users, branches, employees, products, mut low_stock, customers, invoices, backups, recent_activity) =
        futures::try_join!(
            db::users::list(db),
            db::branches::list(db),
            db::employees::list(db),
            db::products::list(db),
            db::products::low_stock(db),
            db::customers::list(db),
            db::invoices::list_between(db, month_start_millis(), i64::MAX),
            db::backups::list(db),
            db::activity::list(db, &activity_filter),
        )?;

    let low_stock_count = low_stock.len();
    low_stock.truncate(LOW_STOCK_PREVIEW);

    let sales: Vec<_> = invoices.into_iter().filter(|inv| inv.counts_as_sale()).collect();

    Ok(Json(DashboardSummary {
        users: users.len(),
        branches: branches.len(),
        employees: employees.len(),
        products: products.len(),
        customers: customers.len(),
        low_stock_count,
        low_stock,
        month_invoice_count: sales.len(),
        month_sales: db::invoices::sales_total(&sales),
        last_backup: backups.into_iter().next(),
        recent_activity,
    }))
}
