//! Console users at `users/{uid}`

use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{RecordStatus, User, UserCreate, UserRole, UserUpdate};

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "users";

/// List filter: all fields optional
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<RecordStatus>,
    pub search: Option<String>,
}

pub async fn list(db: &dyn RealtimeDb) -> ServiceResult<Vec<User>> {
    let mut users: Vec<User> = super::list(db, PATH).await?;
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(users)
}

pub fn filter(users: Vec<User>, filter: &UserFilter) -> Vec<User> {
    users
        .into_iter()
        .filter(|u| filter.role.is_none_or(|r| u.role == r))
        .filter(|u| filter.status.is_none_or(|s| u.status == s))
        .filter(|u| {
            filter
                .search
                .as_deref()
                .is_none_or(|q| super::matches_search(q, &[&u.username, &u.full_name, &u.email]))
        })
        .collect()
}

pub async fn get(db: &dyn RealtimeDb, uid: &str) -> ServiceResult<Option<User>> {
    super::get(db, PATH, uid).await
}

pub async fn find_by_username(db: &dyn RealtimeDb, username: &str) -> ServiceResult<Option<User>> {
    let snap = db
        .query_by_child(PATH, "username", &Value::String(username.to_string()))
        .await?;
    Ok(snap.records::<User>().into_iter().next())
}

async fn ensure_username_free(
    db: &dyn RealtimeDb,
    username: &str,
    except_uid: Option<&str>,
) -> ServiceResult<()> {
    if let Some(existing) = find_by_username(db, username).await?
        && Some(existing.id.as_str()) != except_uid
    {
        return Err(AppError::new(ErrorCode::UsernameExists)
            .with_detail("username", username)
            .into());
    }
    Ok(())
}

/// Create the record for an identity account already registered under `uid`
pub async fn create(db: &dyn RealtimeDb, uid: &str, data: &UserCreate) -> ServiceResult<User> {
    let username = data.username.trim();
    ensure_username_free(db, username, None).await?;

    let user = User {
        id: uid.to_string(),
        username: username.to_string(),
        full_name: data.full_name.trim().to_string(),
        email: data.email.trim().to_lowercase(),
        role: data.role,
        status: RecordStatus::Active,
        branch_id: data.branch_id.clone(),
        last_login: None,
        created_at: shared::util::now_millis(),
        updated_at: None,
    };
    let fields = super::to_fields(&user)?;
    db.set(&format!("{PATH}/{uid}"), Value::Object(fields)).await?;
    Ok(user)
}

pub async fn update(db: &dyn RealtimeDb, uid: &str, data: &UserUpdate) -> ServiceResult<Option<User>> {
    // Stored the same way `create` stores them
    let data = UserUpdate {
        username: data.username.as_deref().map(|u| u.trim().to_string()),
        full_name: data.full_name.as_deref().map(|n| n.trim().to_string()),
        email: data.email.as_deref().map(|e| e.trim().to_lowercase()),
        ..data.clone()
    };
    if let Some(username) = &data.username {
        ensure_username_free(db, username, Some(uid)).await?;
    }
    if !super::patch(db, PATH, uid, &data).await? {
        return Ok(None);
    }
    get(db, uid).await
}

pub async fn set_status(
    db: &dyn RealtimeDb,
    uid: &str,
    status: RecordStatus,
) -> ServiceResult<Option<User>> {
    if !super::patch(db, PATH, uid, &json!({ "status": status })).await? {
        return Ok(None);
    }
    get(db, uid).await
}

pub async fn delete(db: &dyn RealtimeDb, uid: &str) -> ServiceResult<bool> {
    super::delete(db, PATH, uid).await
}

pub async fn touch_last_login(db: &dyn RealtimeDb, uid: &str, at: i64) -> ServiceResult<()> {
    let mut fields = serde_json::Map::new();
    fields.insert("lastLogin".into(), Value::from(at));
    db.update(&format!("{PATH}/{uid}"), fields).await?;
    Ok(())
}
