//! Scheduled automatic backups and activity-log retention
//!
//! Each tick creates an `auto` backup of every category as user `system`, prunes automatic
//! backups beyond the configured count and purges activity entries past retention.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shared::models::{ActivityAction, BackupKind, BackupSelection};
use tokio_util::sync::CancellationToken;

use super::BackupService;
use crate::db::activity::{self, Actor};
use crate::hosted::RealtimeDb;

const SYSTEM_USER: &str = "system";
const SYSTEM_ACTOR: Actor<'static> = Actor {
    user_id: SYSTEM_USER,
    username: SYSTEM_USER,
};
const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

pub struct AutoBackupWorker {
    db: Arc<dyn RealtimeDb>,
    backups: BackupService,
    interval: Duration,
    keep: usize,
    retention_days: u64,
    shutdown: CancellationToken,
}

impl AutoBackupWorker {
    pub fn new(
        db: Arc<dyn RealtimeDb>,
        backups: BackupService,
        interval: Duration,
        keep: usize,
        retention_days: u64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            db,
            backups,
            interval,
            // Never prune the backup this pass just made
            keep: keep.max(1),
            retention_days,
            shutdown,
        }
    }

    /// Main loop. The first tick fires one full interval after start.
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            keep = self.keep,
            "Auto backup worker started"
        );

        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Auto backup worker received shutdown signal");
                    return;
                }
            }
        }
    }

    /// One backup + prune + retention pass. Failures are logged, never propagated.
    pub async fn run_once(&self) {
        let name = format!("Auto backup {}", chrono::Utc::now().format("%Y-%m-%d %H:%M"));
        match self
            .backups
            .create(&name, &BackupSelection::all(), SYSTEM_USER, BackupKind::Auto)
            .await
        {
            Ok(record) => {
                let details = json!({"name": record.name, "size": record.size, "type": "auto"});
                if let Err(e) = activity::record(
                    self.db.as_ref(),
                    &SYSTEM_ACTOR,
                    ActivityAction::BackupCreated,
                    Some(&record.id),
                    Some(details),
                )
                .await
                {
                    tracing::warn!(error = %e, "Failed to record auto backup activity");
                }
            }
            Err(e) => tracing::error!(error = %e, "Auto backup failed"),
        }

        match self.backups.prune_auto(self.keep).await {
            Ok(removed) if !removed.is_empty() => {
                tracing::info!(count = removed.len(), "Pruned old automatic backups");
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Failed to prune automatic backups"),
        }

        if self.retention_days > 0 {
            let cutoff = shared::util::now_millis() - self.retention_days as i64 * DAY_MILLIS;
            match activity::clear_before(self.db.as_ref(), cutoff).await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "Purged expired activity entries"),
                Err(e) => tracing::error!(error = %e, "Activity retention cleanup failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::hosted::{MemoryDb, MemoryStorage};

    fn worker(db: Arc<MemoryDb>, keep: usize, retention_days: u64) -> AutoBackupWorker {
        let backups = BackupService::new(db.clone(), Arc::new(MemoryStorage::new()));
        AutoBackupWorker::new(
            db,
            backups,
            Duration::from_secs(3600),
            keep,
            retention_days,
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_run_once_creates_auto_backup_and_logs() {
        let db = Arc::new(MemoryDb::new());
        let w = worker(db.clone(), 3, 0);
        w.run_once().await;

        let backups = db::backups::list(db.as_ref()).await.unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].kind, BackupKind::Auto);
        assert_eq!(backups[0].user, "system");

        let logs = activity::list(db.as_ref(), &Default::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, ActivityAction::BackupCreated);
    }

    #[tokio::test]
    async fn test_run_once_prunes_to_keep() {
        let db = Arc::new(MemoryDb::new());
        let w = worker(db.clone(), 2, 0);
        for _ in 0..4 {
            w.run_once().await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        let backups = db::backups::list(db.as_ref()).await.unwrap();
        assert_eq!(backups.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_keep_still_keeps_latest() {
        let db = Arc::new(MemoryDb::new());
        let w = worker(db.clone(), 0, 0);
        w.run_once().await;

        let backups = db::backups::list(db.as_ref()).await.unwrap();
        assert_eq!(backups.len(), 1);
        let file = w.backups.download(&backups[0].id).await.unwrap();
        assert_eq!(file.bytes.len() as u64, backups[0].size);
    }

    #[tokio::test]
    async fn test_retention_purges_old_activity() {
        let db = Arc::new(MemoryDb::new());
        db.set(
            "activityLogs/old",
            json!({"userId": "u1", "username": "admin", "action": "login", "type": "auth", "timestamp": 1}),
        )
        .await
        .unwrap();
        let w = worker(db.clone(), 2, 30);
        w.run_once().await;

        let logs = activity::list(db.as_ref(), &Default::default()).await.unwrap();
        assert!(logs.iter().all(|l| l.id != "old"));
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let db = Arc::new(MemoryDb::new());
        let w = worker(db, 1, 0);
        let token = w.shutdown.clone();
        let handle = tokio::spawn(w.run());
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
