//! In-memory hosted backend
//!
//! A JSON tree with the realtime database's write semantics (null removes, empty parents
//! disappear), an object map for file storage, and an account table for sign-in. Used by
//! tests and by `HOSTED_BACKEND=memory` for local development.

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::Snapshot;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    AuthSession, FileStorage, HostedError, HostedResult, IdentityProvider, RealtimeDb,
    StoredObject, validate_path,
};

// ============================================================================
// Realtime database
// ============================================================================

#[derive(Default)]
pub struct MemoryDb {
    root: RwLock<Value>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing tree
    pub fn with_data(root: Value) -> Self {
        Self {
            root: RwLock::new(root),
        }
    }

    /// Copy of the whole tree
    pub async fn dump(&self) -> Value {
        self.root.read().await.clone()
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/').try_fold(root, |node, key| node.get(key))
}

/// Write `value` at `path`, creating parents; null deletes and prunes empty parents
fn write(root: &mut Value, path: &str, value: Value) {
    let keys: Vec<&str> = path.split('/').collect();
    write_keys(root, &keys, value);
}

fn write_keys(node: &mut Value, keys: &[&str], value: Value) {
    let Some((first, rest)) = keys.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };
    if rest.is_empty() {
        if value.is_null() {
            map.remove(*first);
        } else {
            map.insert((*first).to_string(), value);
        }
    } else {
        let child = map.entry((*first).to_string()).or_insert(Value::Null);
        write_keys(child, rest, value);
        if child.is_null() || child.as_object().is_some_and(Map::is_empty) {
            map.remove(*first);
        }
    }
}

#[async_trait]
impl RealtimeDb for MemoryDb {
    async fn get(&self, path: &str) -> HostedResult<Option<Value>> {
        validate_path(path)?;
        let root = self.root.read().await;
        Ok(lookup(&root, path).filter(|v| !v.is_null()).cloned())
    }

    async fn query_by_child(
        &self,
        path: &str,
        child: &str,
        value: &Value,
    ) -> HostedResult<Snapshot> {
        validate_path(path)?;
        let root = self.root.read().await;
        let matches: Map<String, Value> = lookup(&root, path)
            .and_then(Value::as_object)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, record)| record.get(child) == Some(value))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Snapshot::new(Value::Object(matches)))
    }

    async fn push(&self, path: &str, value: Value) -> HostedResult<String> {
        validate_path(path)?;
        let key = shared::util::push_key();
        let mut root = self.root.write().await;
        write(&mut root, &format!("{path}/{key}"), value);
        Ok(key)
    }

    async fn set(&self, path: &str, value: Value) -> HostedResult<()> {
        validate_path(path)?;
        let mut root = self.root.write().await;
        write(&mut root, path, value);
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> HostedResult<()> {
        validate_path(path)?;
        let mut root = self.root.write().await;
        for (key, value) in fields {
            // Update keys may themselves be nested paths
            let child = format!("{path}/{key}");
            validate_path(&child)?;
            write(&mut root, &child, value);
        }
        Ok(())
    }

    async fn remove(&self, path: &str) -> HostedResult<()> {
        validate_path(path)?;
        let mut root = self.root.write().await;
        write(&mut root, path, Value::Null);
        Ok(())
    }
}

// ============================================================================
// File storage
// ============================================================================

const URL_SCHEME: &str = "memory://";

struct StoredFile {
    bytes: Vec<u8>,
    token: String,
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, StoredFile>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.read().await.contains_key(path)
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> HostedResult<StoredObject> {
        if path.is_empty() {
            return Err(HostedError::InvalidPath("empty object name".into()));
        }
        let token = uuid::Uuid::new_v4().to_string();
        let url = format!("{URL_SCHEME}{path}?token={token}");
        self.objects
            .write()
            .await
            .insert(path.to_string(), StoredFile { bytes, token });
        Ok(StoredObject {
            path: path.to_string(),
            url,
        })
    }

    async fn download(&self, url: &str) -> HostedResult<Vec<u8>> {
        let (path, token) = url
            .strip_prefix(URL_SCHEME)
            .and_then(|rest| rest.split_once("?token="))
            .ok_or_else(|| HostedError::InvalidPath(url.to_string()))?;
        let objects = self.objects.read().await;
        match objects.get(path) {
            Some(file) if file.token == token => Ok(file.bytes.clone()),
            Some(_) => Err(HostedError::Status {
                status: 403,
                message: "invalid download token".into(),
            }),
            None => Err(HostedError::NotFound(path.to_string())),
        }
    }

    async fn delete(&self, path: &str) -> HostedResult<()> {
        match self.objects.write().await.remove(path) {
            Some(_) => Ok(()),
            None => Err(HostedError::NotFound(path.to_string())),
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with a fixed uid
    pub async fn add_account(&self, uid: &str, email: &str, password: &str) {
        self.accounts.write().await.insert(
            email.to_lowercase(),
            Account {
                uid: uid.to_string(),
                password: password.to_string(),
            },
        );
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> HostedResult<AuthSession> {
        let accounts = self.accounts.read().await;
        match accounts.get(&email.to_lowercase()) {
            Some(account) if account.password == password => Ok(AuthSession {
                uid: account.uid.clone(),
                email: email.to_lowercase(),
                id_token: format!("memory-token-{}", account.uid),
            }),
            Some(_) => Err(HostedError::Auth("INVALID_PASSWORD".into())),
            None => Err(HostedError::Auth("EMAIL_NOT_FOUND".into())),
        }
    }

    async fn create_account(&self, email: &str, password: &str) -> HostedResult<String> {
        let mut accounts = self.accounts.write().await;
        let email = email.to_lowercase();
        if accounts.contains_key(&email) {
            return Err(HostedError::Status {
                status: 400,
                message: "EMAIL_EXISTS".into(),
            });
        }
        let uid = uuid::Uuid::new_v4().simple().to_string();
        accounts.insert(
            email,
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        Ok(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let db = MemoryDb::new();
        db.set("settings", json!({"storeName": "Corner Shop"}))
            .await
            .unwrap();
        assert_eq!(
            db.get("settings/storeName").await.unwrap(),
            Some(json!("Corner Shop"))
        );
        db.remove("settings/storeName").await.unwrap();
        // Empty parent disappears with its last child
        assert_eq!(db.get("settings").await.unwrap(), None);
        assert_eq!(db.dump().await, json!({}));
    }

    #[tokio::test]
    async fn test_push_keys_are_ordered() {
        let db = MemoryDb::new();
        let a = db.push("products", json!({"name": "A"})).await.unwrap();
        let b = db.push("products", json!({"name": "B"})).await.unwrap();
        assert_ne!(a, b);
        let snap = Snapshot::from(db.get("products").await.unwrap());
        assert_eq!(snap.children().len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_children() {
        let db = MemoryDb::with_data(json!({
            "customers": {"c1": {"name": "Ana", "phone": "1"}, "c2": {"name": "Bo"}}
        }));
        db.update(
            "customers",
            fields(json!({"c1": {"name": "Ana Maria"}, "c3": {"name": "Cy"}})),
        )
        .await
        .unwrap();
        let root = db.dump().await;
        // update replaces each listed child wholesale and leaves the rest alone
        assert_eq!(root["customers"]["c1"], json!({"name": "Ana Maria"}));
        assert_eq!(root["customers"]["c2"], json!({"name": "Bo"}));
        assert_eq!(root["customers"]["c3"], json!({"name": "Cy"}));
    }

    #[tokio::test]
    async fn test_update_with_null_deletes_field() {
        let db = MemoryDb::with_data(json!({"users": {"u1": {"name": "A", "branchId": "b1"}}}));
        db.update("users/u1", fields(json!({"branchId": null})))
            .await
            .unwrap();
        assert_eq!(db.dump().await, json!({"users": {"u1": {"name": "A"}}}));
    }

    #[tokio::test]
    async fn test_query_by_child() {
        let db = MemoryDb::with_data(json!({
            "employees": {
                "e1": {"name": "A", "branchId": "b1"},
                "e2": {"name": "B", "branchId": "b2"},
                "e3": {"name": "C", "branchId": "b1"}
            }
        }));
        let snap = db
            .query_by_child("employees", "branchId", &json!("b1"))
            .await
            .unwrap();
        let keys: Vec<String> = snap.children().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["e1", "e3"]);

        let none = db
            .query_by_child("missing", "branchId", &json!("b1"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_path_rejected() {
        let db = MemoryDb::new();
        assert!(matches!(
            db.set("a.b", json!(1)).await,
            Err(HostedError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_round_trip() {
        let storage = MemoryStorage::new();
        let obj = storage
            .upload("backups/x.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        assert_eq!(storage.download(&obj.url).await.unwrap(), b"{}");
        storage.delete("backups/x.json").await.unwrap();
        assert!(matches!(
            storage.download(&obj.url).await,
            Err(HostedError::NotFound(_))
        ));
        assert!(matches!(
            storage.delete("backups/x.json").await,
            Err(HostedError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_identity() {
        let identity = MemoryIdentity::new();
        identity.add_account("uid-1", "Admin@Shop.test", "secret1").await;
        let session = identity.sign_in("admin@shop.test", "secret1").await.unwrap();
        assert_eq!(session.uid, "uid-1");
        assert!(matches!(
            identity.sign_in("admin@shop.test", "nope").await,
            Err(HostedError::Auth(_))
        ));
        let uid = identity.create_account("new@shop.test", "secret2").await.unwrap();
        assert_eq!(
            identity.sign_in("new@shop.test", "secret2").await.unwrap().uid,
            uid
        );
        assert!(identity.create_account("new@shop.test", "x").await.is_err());
    }
}
