//! Backup history at `backups/{id}`

use shared::models::{BackupKind, BackupRecord};

use crate::error::ServiceResult;
use crate::hosted::RealtimeDb;

pub const PATH: &str = "backups";

/// Newest first
pub async fn list(db: &dyn RealtimeDb) -> ServiceResult<Vec<BackupRecord>> {
    let mut backups: Vec<BackupRecord> = super::list(db, PATH).await?;
    backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(backups)
}

pub async fn list_kind(db: &dyn RealtimeDb, kind: BackupKind) -> ServiceResult<Vec<BackupRecord>> {
    Ok(list(db).await?.into_iter().filter(|b| b.kind == kind).collect())
}

pub async fn get(db: &dyn RealtimeDb, id: &str) -> ServiceResult<Option<BackupRecord>> {
    super::get(db, PATH, id).await
}

pub async fn create(db: &dyn RealtimeDb, mut record: BackupRecord) -> ServiceResult<BackupRecord> {
    record.id = super::insert(db, PATH, &record).await?;
    Ok(record)
}

pub async fn delete(db: &dyn RealtimeDb, id: &str) -> ServiceResult<bool> {
    super::delete(db, PATH, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosted::MemoryDb;

    fn record(name: &str, timestamp: i64, kind: BackupKind) -> BackupRecord {
        BackupRecord {
            id: String::new(),
            name: name.into(),
            path: format!("backups/{timestamp}_{name}.json"),
            url: format!("memory://backups/{timestamp}_{name}.json?token=t"),
            timestamp,
            size: 2,
            user: "admin".into(),
            kind,
            categories: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_newest_first_and_kind_filter() {
        let db = MemoryDb::new();
        create(&db, record("a", 100, BackupKind::Manual)).await.unwrap();
        create(&db, record("b", 300, BackupKind::Auto)).await.unwrap();
        let c = create(&db, record("c", 200, BackupKind::Auto)).await.unwrap();

        let names: Vec<String> = list(&db).await.unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        assert_eq!(list_kind(&db, BackupKind::Auto).await.unwrap().len(), 2);

        let loaded = get(&db, &c.id).await.unwrap().unwrap();
        assert_eq!(loaded, c);
    }
}
