//! Hosted backend bindings
//!
//! The console owns no storage of its own. Records live in a hosted realtime database,
//! backup files in hosted file storage, and console accounts in a hosted identity
//! service. Each service is reached through an object-safe trait so the REST clients can
//! be swapped for the in-memory backend in tests and local development.

pub mod identity;
pub mod memory;
pub mod rtdb;
pub mod storage;

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::Snapshot;
use thiserror::Error;

pub use identity::RestIdentity;
pub use memory::{MemoryDb, MemoryIdentity, MemoryStorage};
pub use rtdb::RestDb;
pub use storage::RestStorage;

/// Hosted service failure
#[derive(Debug, Error)]
pub enum HostedError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("hosted service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for HostedError {
    fn from(e: serde_json::Error) -> Self {
        HostedError::Decode(e.to_string())
    }
}

pub type HostedResult<T> = Result<T, HostedError>;

/// Realtime database: a JSON tree addressed by `/`-separated paths
#[async_trait]
pub trait RealtimeDb: Send + Sync {
    /// Read the value at `path`; JSON null comes back as `None`
    async fn get(&self, path: &str) -> HostedResult<Option<Value>>;

    /// Children of `path` whose `child` field equals `value`
    async fn query_by_child(&self, path: &str, child: &str, value: &Value)
    -> HostedResult<Snapshot>;

    /// Insert under a new database-assigned key and return the key
    async fn push(&self, path: &str, value: Value) -> HostedResult<String>;

    /// Overwrite the value at `path`
    async fn set(&self, path: &str, value: Value) -> HostedResult<()>;

    /// Write only the listed children of `path`, leaving siblings untouched
    async fn update(&self, path: &str, fields: Map<String, Value>) -> HostedResult<()>;

    async fn remove(&self, path: &str) -> HostedResult<()>;
}

/// Uploaded object: storage path plus its download URL
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub path: String,
    pub url: String,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str)
    -> HostedResult<StoredObject>;

    /// Fetch an object by the download URL returned from `upload`
    async fn download(&self, url: &str) -> HostedResult<Vec<u8>>;

    async fn delete(&self, path: &str) -> HostedResult<()>;
}

/// Signed-in identity
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub uid: String,
    pub email: String,
    pub id_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Email/password sign-in. Wrong credentials are `HostedError::Auth`.
    async fn sign_in(&self, email: &str, password: &str) -> HostedResult<AuthSession>;

    /// Register a new account and return its uid
    async fn create_account(&self, email: &str, password: &str) -> HostedResult<String>;
}

/// Turn a non-success response into `HostedError::Status`, keeping the vendor message.
///
/// The hosted APIs report errors as `{"error": "..."}` or `{"error": {"message": "..."}}`.
pub(crate) async fn check_status(resp: reqwest::Response) -> HostedResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| match &v["error"] {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("message").and_then(Value::as_str).map(String::from),
            _ => None,
        })
        .unwrap_or(body);
    Err(HostedError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Path keys may not be empty or contain `.`, `#`, `$`, `[`, `]`.
pub fn validate_path(path: &str) -> HostedResult<()> {
    if path.is_empty() {
        return Err(HostedError::InvalidPath("empty path".into()));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(HostedError::InvalidPath(format!("empty segment in '{path}'")));
        }
        if segment.contains(['.', '#', '$', '[', ']']) {
            return Err(HostedError::InvalidPath(format!(
                "illegal character in '{segment}'"
            )));
        }
    }
    Ok(())
}
