//! Sales invoices at `invoices/{id}` (read-only for the console)

use serde_json::Value;
use shared::models::Invoice;

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "invoices";

fn newest_first(invoices: &mut [Invoice]) {
    invoices.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

pub async fn list(db: &dyn RealtimeDb) -> ServiceResult<Vec<Invoice>> {
    let mut invoices: Vec<Invoice> = super::list(db, PATH).await?;
    newest_first(&mut invoices);
    Ok(invoices)
}

pub async fn get(db: &dyn RealtimeDb, id: &str) -> ServiceResult<Option<Invoice>> {
    super::get(db, PATH, id).await
}

async fn list_by(db: &dyn RealtimeDb, child: &str, id: &str) -> ServiceResult<Vec<Invoice>> {
    let snap = db
        .query_by_child(PATH, child, &Value::String(id.to_string()))
        .await?;
    let mut invoices = snap.records();
    newest_first(&mut invoices);
    Ok(invoices)
}

/// Purchase history of one customer
pub async fn list_for_customer(db: &dyn RealtimeDb, customer_id: &str) -> ServiceResult<Vec<Invoice>> {
    list_by(db, "customerId", customer_id).await
}

pub async fn list_for_employee(db: &dyn RealtimeDb, employee_id: &str) -> ServiceResult<Vec<Invoice>> {
    list_by(db, "employeeId", employee_id).await
}

/// Invoices with `from <= timestamp < to`
pub async fn list_between(db: &dyn RealtimeDb, from: i64, to: i64) -> ServiceResult<Vec<Invoice>> {
    Ok(list(db)
        .await?
        .into_iter()
        .filter(|inv| inv.timestamp >= from && inv.timestamp < to)
        .collect())
}

/// Sum of invoice totals that count as sales
pub fn sales_total(invoices: &[Invoice]) -> f64 {
    invoices
        .iter()
        .filter(|inv| inv.counts_as_sale())
        .map(|inv| inv.total)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosted::MemoryDb;
    use serde_json::json;

    fn seeded() -> MemoryDb {
        MemoryDb::with_data(json!({
            "invoices": {
                "i1": {"number": "A-1", "customerId": "c1", "employeeId": "e1", "total": 10.0, "timestamp": 100, "status": "paid"},
                "i2": {"number": "A-2", "customerId": "c1", "employeeId": "e2", "total": 20.0, "timestamp": 200, "status": "paid"},
                "i3": {"number": "A-3", "customerId": "c2", "employeeId": "e1", "total": 30.0, "timestamp": 300, "status": "void"},
                "i4": {"number": "A-4", "employeeId": "e1", "total": 5.5, "timestamp": 400}
            }
        }))
    }

    #[tokio::test]
    async fn test_lists() {
        let db = seeded();
        let all = list(&db).await.unwrap();
        assert_eq!(all.first().map(|i| i.id.as_str()), Some("i4"));

        let c1 = list_for_customer(&db, "c1").await.unwrap();
        let ids: Vec<&str> = c1.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i2", "i1"]);

        let range = list_between(&db, 200, 400).await.unwrap();
        assert_eq!(range.len(), 2);
    }

    #[tokio::test]
    async fn test_sales_total_skips_void() {
        let db = seeded();
        let e1 = list_for_employee(&db, "e1").await.unwrap();
        assert_eq!(e1.len(), 3);
        assert_eq!(sales_total(&e1), 15.5);
    }
}
