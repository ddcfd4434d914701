//! Inventory products at `products/{id}`

use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate, RecordStatus};

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "products";

pub async fn list(db: &dyn RealtimeDb) -> ServiceResult<Vec<Product>> {
    let mut products: Vec<Product> = super::list(db, PATH).await?;
    products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(products)
}

/// Name/SKU search and exact category filter
pub fn filter(products: Vec<Product>, search: Option<&str>, category: Option<&str>) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| category.is_none_or(|c| p.category.eq_ignore_ascii_case(c)))
        .filter(|p| search.is_none_or(|q| super::matches_search(q, &[&p.name, &p.sku])))
        .collect()
}

/// Active products at or below their minimum stock, lowest stock first
pub async fn low_stock(db: &dyn RealtimeDb) -> ServiceResult<Vec<Product>> {
    let mut products: Vec<Product> = list(db)
        .await?
        .into_iter()
        .filter(|p| p.status.is_active() && p.is_low_stock())
        .collect();
    products.sort_by_key(|p| p.stock);
    Ok(products)
}

pub async fn get(db: &dyn RealtimeDb, id: &str) -> ServiceResult<Option<Product>> {
    super::get(db, PATH, id).await
}

async fn ensure_sku_free(db: &dyn RealtimeDb, sku: &str, except_id: Option<&str>) -> ServiceResult<()> {
    let sku = sku.trim();
    if sku.is_empty() {
        return Ok(());
    }
    let taken = list(db)
        .await?
        .into_iter()
        .any(|p| p.sku.eq_ignore_ascii_case(sku) && Some(p.id.as_str()) != except_id);
    if taken {
        return Err(AppError::new(ErrorCode::ProductSkuExists)
            .with_detail("sku", sku)
            .into());
    }
    Ok(())
}

pub async fn create(db: &dyn RealtimeDb, data: &ProductCreate) -> ServiceResult<Product> {
    ensure_sku_free(db, &data.sku, None).await?;
    let mut product = Product {
        id: String::new(),
        name: data.name.trim().to_string(),
        sku: data.sku.trim().to_string(),
        category: data.category.trim().to_string(),
        price: data.price,
        cost: data.cost,
        stock: data.stock,
        min_stock: data.min_stock,
        unit: data.unit.trim().to_string(),
        status: RecordStatus::Active,
        created_at: shared::util::now_millis(),
        updated_at: None,
    };
    product.id = super::insert(db, PATH, &product).await?;
    Ok(product)
}

pub async fn update(
    db: &dyn RealtimeDb,
    id: &str,
    data: &ProductUpdate,
) -> ServiceResult<Option<Product>> {
    if let Some(sku) = &data.sku {
        ensure_sku_free(db, sku, Some(id)).await?;
    }
    if !super::patch(db, PATH, id, data).await? {
        return Ok(None);
    }
    get(db, id).await
}

/// Read-modify-write of `stock`; the result may not go below zero
pub async fn adjust_stock(db: &dyn RealtimeDb, id: &str, delta: i64) -> ServiceResult<Option<Product>> {
    let Some(product) = get(db, id).await? else {
        return Ok(None);
    };
    let new_stock = product.stock.checked_add(delta).unwrap_or(i64::MIN);
    if new_stock < 0 {
        return Err(AppError::new(ErrorCode::InsufficientStock)
            .with_detail("id", id)
            .with_detail("stock", product.stock)
            .with_detail("delta", delta)
            .into());
    }
    super::patch(db, PATH, id, &serde_json::json!({ "stock": new_stock })).await?;
    get(db, id).await
}

pub async fn delete(db: &dyn RealtimeDb, id: &str) -> ServiceResult<bool> {
    super::delete(db, PATH, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::hosted::MemoryDb;

    fn product(name: &str, sku: &str, stock: i64, min_stock: i64) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            sku: sku.into(),
            category: "Drinks".into(),
            price: 2.5,
            cost: 1.0,
            stock,
            min_stock,
            unit: "pcs".into(),
        }
    }

    #[tokio::test]
    async fn test_sku_unique() {
        let db = MemoryDb::new();
        let cola = create(&db, &product("Cola", "DR-1", 10, 2)).await.unwrap();
        let err = create(&db, &product("Cola Zero", "dr-1", 10, 2)).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(e) if e.code == ErrorCode::ProductSkuExists));
        // Empty SKUs never collide
        create(&db, &product("Loose candy", "", 10, 2)).await.unwrap();
        create(&db, &product("Gum", "", 10, 2)).await.unwrap();
        // Keeping one's own SKU on update is fine
        let update_same = ProductUpdate {
            sku: Some("DR-1".into()),
            ..Default::default()
        };
        assert!(update(&db, &cola.id, &update_same).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = MemoryDb::new();
        let p = create(&db, &product("Water", "DR-2", 5, 2)).await.unwrap();
        let p2 = adjust_stock(&db, &p.id, 10).await.unwrap().unwrap();
        assert_eq!(p2.stock, 15);
        let p3 = adjust_stock(&db, &p.id, -15).await.unwrap().unwrap();
        assert_eq!(p3.stock, 0);

        let err = adjust_stock(&db, &p.id, -1).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(e) if e.code == ErrorCode::InsufficientStock));
        assert_eq!(get(&db, &p.id).await.unwrap().unwrap().stock, 0);

        assert!(adjust_stock(&db, "missing", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_low_stock_and_filter() {
        let db = MemoryDb::new();
        create(&db, &product("Juice", "DR-3", 1, 3)).await.unwrap();
        create(&db, &product("Milk", "DR-4", 3, 3)).await.unwrap();
        create(&db, &product("Soda", "DR-5", 30, 3)).await.unwrap();

        let low = low_stock(&db).await.unwrap();
        let names: Vec<&str> = low.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Juice", "Milk"]);

        let all = list(&db).await.unwrap();
        assert_eq!(filter(all.clone(), Some("dr-5"), None).len(), 1);
        assert_eq!(filter(all.clone(), None, Some("drinks")).len(), 3);
        assert!(filter(all, None, Some("Snacks")).is_empty());
    }
}
