//! Branches at `branches/{id}`

use shared::error::{AppError, ErrorCode};
use shared::models::{Branch, BranchCreate, BranchUpdate, RecordStatus};

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "branches";

pub async fn list(db: &dyn RealtimeDb) -> ServiceResult<Vec<Branch>> {
    let mut branches: Vec<Branch> = super::list(db, PATH).await?;
    branches.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(branches)
}

pub async fn get(db: &dyn RealtimeDb, id: &str) -> ServiceResult<Option<Branch>> {
    super::get(db, PATH, id).await
}

pub async fn create(db: &dyn RealtimeDb, data: &BranchCreate) -> ServiceResult<Branch> {
    let mut branch = Branch {
        id: String::new(),
        name: data.name.trim().to_string(),
        address: data.address.trim().to_string(),
        phone: data.phone.trim().to_string(),
        manager_id: data.manager_id.clone(),
        status: RecordStatus::Active,
        created_at: shared::util::now_millis(),
        updated_at: None,
    };
    branch.id = super::insert(db, PATH, &branch).await?;
    Ok(branch)
}

pub async fn update(db: &dyn RealtimeDb, id: &str, data: &BranchUpdate) -> ServiceResult<Option<Branch>> {
    if !super::patch(db, PATH, id, data).await? {
        return Ok(None);
    }
    get(db, id).await
}

/// Delete a branch that no employee is assigned to
pub async fn delete(db: &dyn RealtimeDb, id: &str) -> ServiceResult<bool> {
    let assigned = super::employees::list_by_branch(db, id).await?;
    if !assigned.is_empty() {
        return Err(AppError::new(ErrorCode::BranchHasEmployees)
            .with_detail("id", id)
            .with_detail("employees", assigned.len())
            .into());
    }
    super::delete(db, PATH, id).await
}
