//! Hosted-database access, one module per collection
//!
//! Records are stored without their key; reads inject the key as `id` and writes strip
//! it again. Creation stamps `createdAt`, updates stamp `updatedAt`.

pub mod activity;
pub mod backups;
pub mod branches;
pub mod customers;
pub mod employees;
pub mod invoices;
pub mod products;
pub mod salaries;
pub mod settings;
pub mod users;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::Snapshot;
use shared::error::AppError;

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

/// Serialize a record or partial update into the fields to write, without `id`
pub(crate) fn to_fields<T: Serialize>(value: &T) -> ServiceResult<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut fields)) => {
            fields.remove("id");
            Ok(fields)
        }
        Ok(other) => Err(AppError::internal(format!("expected a JSON object, got {other}")).into()),
        Err(e) => Err(AppError::internal(format!("failed to serialize record: {e}")).into()),
    }
}

/// All records of a collection
pub(crate) async fn list<T: DeserializeOwned>(
    db: &dyn RealtimeDb,
    collection: &str,
) -> ServiceResult<Vec<T>> {
    let value = db.get(collection).await?;
    Ok(Snapshot::from(value).records())
}

/// One record by key
pub(crate) async fn get<T: DeserializeOwned>(
    db: &dyn RealtimeDb,
    collection: &str,
    id: &str,
) -> ServiceResult<Option<T>> {
    let value = db.get(&format!("{collection}/{id}")).await?;
    Ok(value.and_then(|v| Snapshot::new(v).record(id)))
}

/// Push a new record and return its key
pub(crate) async fn insert<T: Serialize>(
    db: &dyn RealtimeDb,
    collection: &str,
    record: &T,
) -> ServiceResult<String> {
    let fields = to_fields(record)?;
    Ok(db.push(collection, Value::Object(fields)).await?)
}

/// Write the present fields of a partial update plus `updatedAt`.
///
/// Returns `false` without writing when the record does not exist.
pub(crate) async fn patch<T: Serialize>(
    db: &dyn RealtimeDb,
    collection: &str,
    id: &str,
    update: &T,
) -> ServiceResult<bool> {
    patch_fields(db, collection, id, to_fields(update)?).await
}

/// [`patch`] with pre-built fields; a null value removes that field
pub(crate) async fn patch_fields(
    db: &dyn RealtimeDb,
    collection: &str,
    id: &str,
    mut fields: Map<String, Value>,
) -> ServiceResult<bool> {
    let path = format!("{collection}/{id}");
    if db.get(&path).await?.is_none() {
        return Ok(false);
    }
    fields.insert("updatedAt".into(), Value::from(shared::util::now_millis()));
    db.update(&path, fields).await?;
    Ok(true)
}

/// Remove a record; `false` when it did not exist
pub(crate) async fn delete(db: &dyn RealtimeDb, collection: &str, id: &str) -> ServiceResult<bool> {
    let path = format!("{collection}/{id}");
    if db.get(&path).await?.is_none() {
        return Ok(false);
    }
    db.remove(&path).await?;
    Ok(true)
}

/// Case-insensitive substring match; an empty needle matches everything
pub(crate) fn matches_search(needle: &str, haystacks: &[&str]) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
}
