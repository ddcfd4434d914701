//! Backup and restore of hosted-database subtrees
//!
//! A backup file is one compact JSON object keyed by category path:
//!
//! ```text
//! {"products": {...}, "customers": {...}, "settings": {...}}
//! ```
//!
//! Restore writes selected categories back with a partial update of the category path,
//! so records missing from the file are left alone and other categories are never
//! touched.

pub mod worker;

use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::{Map, Value};
use shared::Snapshot;
use shared::error::{AppError, ErrorCode};
use shared::models::{BackupCategory, BackupKind, BackupRecord, BackupSelection, RestoreReport};

use crate::db;
use crate::error::ServiceResult;
use crate::hosted::{FileStorage, HostedError, RealtimeDb};

pub use worker::AutoBackupWorker;

const CONTENT_TYPE: &str = "application/json";

/// Downloaded backup file
#[derive(Debug, Clone)]
pub struct BackupFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct BackupService {
    db: Arc<dyn RealtimeDb>,
    storage: Arc<dyn FileStorage>,
}

impl BackupService {
    pub fn new(db: Arc<dyn RealtimeDb>, storage: Arc<dyn FileStorage>) -> Self {
        Self { db, storage }
    }

    /// Read the selected categories into one object keyed by category path.
    ///
    /// Missing collections become `{}`, missing settings become `null`.
    pub async fn collect(&self, selection: &BackupSelection) -> ServiceResult<Value> {
        let categories = selection.categories();
        let reads = categories.iter().map(|c| self.db.get(c.path()));
        let values = try_join_all(reads).await?;

        let mut payload = Map::new();
        for (category, value) in categories.iter().zip(values) {
            let value = match (value, category.is_collection()) {
                (Some(v), _) => v,
                (None, true) => Value::Object(Map::new()),
                (None, false) => Value::Null,
            };
            payload.insert(category.path().to_string(), value);
        }
        Ok(Value::Object(payload))
    }

    /// Export, upload and record a backup. `size` is the byte length of the uploaded payload.
    pub async fn create(
        &self,
        name: &str,
        selection: &BackupSelection,
        user: &str,
        kind: BackupKind,
    ) -> ServiceResult<BackupRecord> {
        if selection.is_empty() {
            return Err(AppError::new(ErrorCode::BackupEmptySelection).into());
        }

        let payload = self.collect(selection).await?;
        let bytes = serde_json::to_vec(&payload)
            .map_err(|e| AppError::internal(format!("failed to serialize backup: {e}")))?;
        let size = bytes.len() as u64;

        let timestamp = shared::util::now_millis();
        let path = format!("backups/{timestamp}_{}.json", shared::util::slugify(name));
        let stored = self
            .storage
            .upload(&path, bytes, CONTENT_TYPE)
            .await
            .map_err(|e| {
                tracing::error!(path = %path, error = %e, "Backup upload failed");
                AppError::new(ErrorCode::BackupUploadFailed).with_detail("reason", e.to_string())
            })?;

        let record = BackupRecord {
            id: String::new(),
            name: name.trim().to_string(),
            path: stored.path,
            url: stored.url,
            timestamp,
            size,
            user: user.to_string(),
            kind,
            categories: selection.categories(),
        };
        let record = db::backups::create(self.db.as_ref(), record).await?;

        tracing::info!(
            id = %record.id,
            name = %record.name,
            size = record.size,
            kind = ?record.kind,
            "Backup created"
        );
        Ok(record)
    }

    async fn load_record(&self, id: &str) -> ServiceResult<BackupRecord> {
        db::backups::get(self.db.as_ref(), id)
            .await?
            .ok_or_else(|| AppError::missing(ErrorCode::BackupNotFound, id).into())
    }

    async fn fetch(&self, record: &BackupRecord) -> ServiceResult<Vec<u8>> {
        self.storage.download(&record.url).await.map_err(|e| {
            tracing::error!(id = %record.id, error = %e, "Backup download failed");
            AppError::new(ErrorCode::BackupDownloadFailed)
                .with_detail("id", record.id.clone())
                .with_detail("reason", e.to_string())
                .into()
        })
    }

    /// Merge the selected categories of a backup back into live data
    pub async fn restore(&self, id: &str, selection: &BackupSelection) -> ServiceResult<RestoreReport> {
        if selection.is_empty() {
            return Err(AppError::new(ErrorCode::BackupEmptySelection).into());
        }
        let record = self.load_record(id).await?;
        let bytes = self.fetch(&record).await?;
        let Ok(Value::Object(file)) = serde_json::from_slice::<Value>(&bytes) else {
            return Err(AppError::new(ErrorCode::BackupFileInvalid)
                .with_detail("id", id)
                .into());
        };

        let mut report = RestoreReport::default();
        for category in selection.categories() {
            match file.get(category.path()).and_then(|v| restore_fields(category, v)) {
                Some(fields) => {
                    self.db.update(category.path(), fields).await?;
                    report.restored.push(category);
                }
                None => report.skipped.push(category),
            }
        }

        tracing::info!(
            id = %id,
            restored = ?report.restored,
            skipped = ?report.skipped,
            "Backup restored"
        );
        Ok(report)
    }

    pub async fn download(&self, id: &str) -> ServiceResult<BackupFile> {
        let record = self.load_record(id).await?;
        let bytes = self.fetch(&record).await?;
        let file_name = record
            .path
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("{}.json", shared::util::slugify(&record.name)));
        Ok(BackupFile { file_name, bytes })
    }

    /// Delete the stored file, then the history record. A file already gone is ignored.
    pub async fn delete(&self, id: &str) -> ServiceResult<BackupRecord> {
        let record = self.load_record(id).await?;
        match self.storage.delete(&record.path).await {
            Ok(()) => {}
            Err(HostedError::NotFound(path)) => {
                tracing::warn!(id = %id, path = %path, "Backup file already missing");
            }
            Err(e) => {
                tracing::error!(id = %id, error = %e, "Failed to delete backup file");
                return Err(AppError::new(ErrorCode::StorageError)
                    .with_detail("reason", e.to_string())
                    .into());
            }
        }
        db::backups::delete(self.db.as_ref(), id).await?;
        tracing::info!(id = %id, name = %record.name, "Backup deleted");
        Ok(record)
    }

    /// Delete automatic backups beyond the newest `keep`; returns the deleted records
    pub async fn prune_auto(&self, keep: usize) -> ServiceResult<Vec<BackupRecord>> {
        let autos = db::backups::list_kind(self.db.as_ref(), BackupKind::Auto).await?;
        let mut removed = Vec::new();
        for record in autos.into_iter().skip(keep) {
            removed.push(self.delete(&record.id).await?);
        }
        Ok(removed)
    }
}

/// Fields to write back for one category, `None` when the file has nothing usable
fn restore_fields(category: BackupCategory, value: &Value) -> Option<Map<String, Value>> {
    if category.is_collection() {
        // Dense integer keys may have been stored as an array
        let children = Snapshot::new(value.clone()).children();
        match value {
            Value::Object(_) | Value::Array(_) => Some(children.into_iter().collect()),
            _ => None,
        }
    } else {
        value.as_object().cloned()
    }
}
