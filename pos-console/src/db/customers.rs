//! Customers at `customers/{id}`

use shared::models::{Customer, CustomerCreate, CustomerUpdate};

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "customers";

pub async fn list(db: &dyn RealtimeDb) -> ServiceResult<Vec<Customer>> {
    let mut customers: Vec<Customer> = super::list(db, PATH).await?;
    customers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(customers)
}

/// Name/phone/email search
pub fn filter(customers: Vec<Customer>, search: Option<&str>) -> Vec<Customer> {
    customers
        .into_iter()
        .filter(|c| search.is_none_or(|q| super::matches_search(q, &[&c.name, &c.phone, &c.email])))
        .collect()
}

pub async fn get(db: &dyn RealtimeDb, id: &str) -> ServiceResult<Option<Customer>> {
    super::get(db, PATH, id).await
}

pub async fn create(db: &dyn RealtimeDb, data: &CustomerCreate) -> ServiceResult<Customer> {
    let mut customer = Customer {
        id: String::new(),
        name: data.name.trim().to_string(),
        phone: data.phone.trim().to_string(),
        email: data.email.trim().to_string(),
        address: data.address.trim().to_string(),
        points: 0,
        total_spent: 0.0,
        note: data.note.clone().filter(|n| !n.trim().is_empty()),
        created_at: shared::util::now_millis(),
        updated_at: None,
    };
    customer.id = super::insert(db, PATH, &customer).await?;
    Ok(customer)
}

pub async fn update(
    db: &dyn RealtimeDb,
    id: &str,
    data: &CustomerUpdate,
) -> ServiceResult<Option<Customer>> {
    if !super::patch(db, PATH, id, data).await? {
        return Ok(None);
    }
    get(db, id).await
}

/// Invoices referencing the customer are left as they are
pub async fn delete(db: &dyn RealtimeDb, id: &str) -> ServiceResult<bool> {
    super::delete(db, PATH, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosted::MemoryDb;

    fn customer(name: &str, phone: &str) -> CustomerCreate {
        CustomerCreate {
            name: name.into(),
            phone: phone.into(),
            email: String::new(),
            address: String::new(),
            note: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn test_create_search_update() {
        let db = MemoryDb::new();
        let ana = create(&db, &customer("Ana Lima", "555-0101")).await.unwrap();
        create(&db, &customer("Bruno", "555-0202")).await.unwrap();
        assert!(ana.note.is_none());
        assert_eq!(ana.points, 0);

        let all = list(&db).await.unwrap();
        assert_eq!(filter(all.clone(), Some("0202")).len(), 1);
        assert_eq!(filter(all, Some("lima")).len(), 1);

        let updated = update(
            &db,
            &ana.id,
            &CustomerUpdate {
                points: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.points, 40);
        assert_eq!(updated.phone, "555-0101");
    }
}
