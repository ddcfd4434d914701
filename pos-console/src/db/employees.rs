//! Employees at `employees/{id}`

use serde_json::Value;
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate, RecordStatus};

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "employees";

pub async fn list(db: &dyn RealtimeDb) -> ServiceResult<Vec<Employee>> {
    let mut employees: Vec<Employee> = super::list(db, PATH).await?;
    employees.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(employees)
}

pub async fn list_by_branch(db: &dyn RealtimeDb, branch_id: &str) -> ServiceResult<Vec<Employee>> {
    let snap = db
        .query_by_child(PATH, "branchId", &Value::String(branch_id.to_string()))
        .await?;
    Ok(snap.records())
}

/// Name/position/phone/email search plus optional branch and status filters
pub fn filter(
    employees: Vec<Employee>,
    search: Option<&str>,
    branch_id: Option<&str>,
    status: Option<RecordStatus>,
) -> Vec<Employee> {
    employees
        .into_iter()
        .filter(|e| branch_id.is_none_or(|b| e.branch_id.as_deref() == Some(b)))
        .filter(|e| status.is_none_or(|s| e.status == s))
        .filter(|e| {
            search.is_none_or(|q| {
                super::matches_search(q, &[&e.name, &e.position, &e.phone, &e.email])
            })
        })
        .collect()
}

pub async fn get(db: &dyn RealtimeDb, id: &str) -> ServiceResult<Option<Employee>> {
    super::get(db, PATH, id).await
}

pub async fn create(db: &dyn RealtimeDb, data: &EmployeeCreate) -> ServiceResult<Employee> {
    let mut employee = Employee {
        id: String::new(),
        name: data.name.trim().to_string(),
        phone: data.phone.trim().to_string(),
        email: data.email.trim().to_string(),
        position: data.position.trim().to_string(),
        branch_id: data.branch_id.clone().filter(|b| !b.is_empty()),
        salary: data.salary,
        commission_rate: data.commission_rate,
        allowance: data.allowance,
        status: RecordStatus::Active,
        hire_date: data.hire_date.clone(),
        created_at: shared::util::now_millis(),
        updated_at: None,
    };
    employee.id = super::insert(db, PATH, &employee).await?;
    Ok(employee)
}

pub async fn update(
    db: &dyn RealtimeDb,
    id: &str,
    data: &EmployeeUpdate,
) -> ServiceResult<Option<Employee>> {
    let mut fields = super::to_fields(data)?;
    // An empty branch id unassigns the employee
    if data.branch_id.as_deref().is_some_and(|b| b.trim().is_empty()) {
        fields.insert("branchId".into(), Value::Null);
    }
    if !super::patch_fields(db, PATH, id, fields).await? {
        return Ok(None);
    }
    get(db, id).await
}

/// Salary history is kept when an employee is deleted
pub async fn delete(db: &dyn RealtimeDb, id: &str) -> ServiceResult<bool> {
    super::delete(db, PATH, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosted::MemoryDb;

    fn employee(name: &str, branch: Option<&str>) -> EmployeeCreate {
        EmployeeCreate {
            name: name.into(),
            phone: String::new(),
            email: String::new(),
            position: "Sales".into(),
            branch_id: branch.map(String::from),
            salary: 2000.0,
            commission_rate: 3.0,
            allowance: 100.0,
            hire_date: Some("2024-03-01".into()),
        }
    }

    #[tokio::test]
    async fn test_list_by_branch() {
        let db = MemoryDb::new();
        create(&db, &employee("Ann", Some("b1"))).await.unwrap();
        create(&db, &employee("Ben", Some("b2"))).await.unwrap();
        create(&db, &employee("Cat", Some("b1"))).await.unwrap();
        create(&db, &employee("Dan", None)).await.unwrap();

        let b1 = list_by_branch(&db, "b1").await.unwrap();
        assert_eq!(b1.len(), 2);
        assert!(b1.iter().all(|e| e.branch_id.as_deref() == Some("b1")));

        let all = list(&db).await.unwrap();
        assert_eq!(filter(all.clone(), None, Some("b2"), None).len(), 1);
        assert_eq!(filter(all, Some("an"), None, None).len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_other_fields() {
        let db = MemoryDb::new();
        let e = create(&db, &employee("Ann", None)).await.unwrap();
        let updated = update(
            &db,
            &e.id,
            &EmployeeUpdate {
                commission_rate: Some(5.0),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.commission_rate, 5.0);
        assert_eq!(updated.salary, 2000.0);
        assert!(update(&db, "missing", &EmployeeUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_empty_branch_unassigns() {
        let db = MemoryDb::new();
        let e = create(&db, &employee("Ann", Some("b1"))).await.unwrap();
        let updated = update(
            &db,
            &e.id,
            &EmployeeUpdate {
                branch_id: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.branch_id, None);
        assert!(list_by_branch(&db, "b1").await.unwrap().is_empty());

        let raw = db.get(&format!("{PATH}/{}", e.id)).await.unwrap().unwrap();
        assert!(raw.get("branchId").is_none());
    }
}
