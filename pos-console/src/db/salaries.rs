//! Salary records at `salaries/{id}`

use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::SalaryRecord;

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "salaries";

fn newest_period_first(records: &mut [SalaryRecord]) {
    records.sort_by(|a, b| (b.year, b.month, b.created_at).cmp(&(a.year, a.month, a.created_at)));
}

pub async fn list_for_employee(
    db: &dyn RealtimeDb,
    employee_id: &str,
) -> ServiceResult<Vec<SalaryRecord>> {
    let snap = db
        .query_by_child(PATH, "employeeId", &Value::String(employee_id.to_string()))
        .await?;
    let mut records = snap.records();
    newest_period_first(&mut records);
    Ok(records)
}

pub async fn list_for_period(
    db: &dyn RealtimeDb,
    month: u32,
    year: i32,
) -> ServiceResult<Vec<SalaryRecord>> {
    let snap = db.query_by_child(PATH, "month", &Value::from(month)).await?;
    let mut records: Vec<SalaryRecord> = snap
        .records::<SalaryRecord>()
        .into_iter()
        .filter(|r| r.year == year)
        .collect();
    records.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));
    Ok(records)
}

pub async fn get(db: &dyn RealtimeDb, id: &str) -> ServiceResult<Option<SalaryRecord>> {
    super::get(db, PATH, id).await
}

/// Store a computed salary; one record per employee and month
pub async fn create(db: &dyn RealtimeDb, mut record: SalaryRecord) -> ServiceResult<SalaryRecord> {
    let existing = list_for_employee(db, &record.employee_id).await?;
    if existing
        .iter()
        .any(|r| r.month == record.month && r.year == record.year)
    {
        return Err(AppError::new(ErrorCode::SalaryAlreadyRecorded)
            .with_detail("employeeId", record.employee_id.clone())
            .with_detail("month", record.month)
            .with_detail("year", record.year)
            .into());
    }
    if record.created_at == 0 {
        record.created_at = shared::util::now_millis();
    }
    record.id = super::insert(db, PATH, &record).await?;
    Ok(record)
}

pub async fn delete(db: &dyn RealtimeDb, id: &str) -> ServiceResult<bool> {
    super::delete(db, PATH, id).await
}
