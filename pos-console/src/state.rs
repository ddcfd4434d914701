//! Application state for pos-console

use std::sync::Arc;
use std::time::Duration;

use shared::error::{AppError, ErrorCode};
use shared::models::{UserCreate, UserRole};

use crate::auth::rate_limit::RateLimiter;
use crate::backup::BackupService;
use crate::config::{BackendKind, Config};
use crate::db;
use crate::hosted::{
    FileStorage, IdentityProvider, MemoryDb, MemoryIdentity, MemoryStorage, RealtimeDb, RestDb,
    RestIdentity, RestStorage,
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Hosted realtime database
    pub db: Arc<dyn RealtimeDb>,
    /// Hosted file storage (backup files)
    pub storage: Arc<dyn FileStorage>,
    /// Hosted identity service (console accounts)
    pub identity: Arc<dyn IdentityProvider>,
    pub backups: BackupService,
    /// JWT secret for console sessions
    pub jwt_secret: String,
    /// Rate limiter for the login route
    pub rate_limiter: RateLimiter,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the hosted clients for the configured backend.
    ///
    /// The memory backend is seeded with the development admin account.
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        match config.backend {
            BackendKind::Rest => {
                let client = reqwest::Client::builder()
                    .timeout(HTTP_TIMEOUT)
                    .build()
                    .map_err(|e| {
                        AppError::with_message(ErrorCode::ConfigError, format!("HTTP client: {e}"))
                    })?;
                let db = RestDb::new(
                    client.clone(),
                    &config.database_url,
                    config.database_auth_token.clone(),
                );
                let storage = RestStorage::new(
                    client.clone(),
                    &config.storage_bucket,
                    config.database_auth_token.clone(),
                );
                let identity = RestIdentity::new(client, &config.identity_api_key);
                tracing::info!(database = %config.database_url, "Using hosted REST backend");
                Ok(Self::from_parts(
                    Arc::new(db),
                    Arc::new(storage),
                    Arc::new(identity),
                    config.clone(),
                ))
            }
            BackendKind::Memory => {
                let db = Arc::new(MemoryDb::new());
                let identity = Arc::new(MemoryIdentity::new());
                seed_dev_admin(db.as_ref(), identity.as_ref(), config).await?;
                tracing::warn!("Using in-memory backend, data is lost on exit");
                Ok(Self::from_parts(
                    db,
                    Arc::new(MemoryStorage::new()),
                    identity,
                    config.clone(),
                ))
            }
        }
    }

    pub fn from_parts(
        db: Arc<dyn RealtimeDb>,
        storage: Arc<dyn FileStorage>,
        identity: Arc<dyn IdentityProvider>,
        config: Config,
    ) -> Self {
        Self {
            backups: BackupService::new(db.clone(), storage.clone()),
            db,
            storage,
            identity,
            jwt_secret: config.jwt_secret.clone(),
            rate_limiter: RateLimiter::new(),
            config: Arc::new(config),
        }
    }
}

/// Register the development admin in the memory identity service and `users/{uid}`
pub async fn seed_dev_admin(
    db: &dyn RealtimeDb,
    identity: &MemoryIdentity,
    config: &Config,
) -> Result<(), AppError> {
    let uid = "dev-admin";
    identity
        .add_account(uid, &config.dev_admin_email, &config.dev_admin_password)
        .await;
    let admin = UserCreate {
        username: "admin".into(),
        full_name: "Administrator".into(),
        email: config.dev_admin_email.clone(),
        password: config.dev_admin_password.clone(),
        role: UserRole::Admin,
        branch_id: None,
    };
    db::users::create(db, uid, &admin).await?;
    tracing::info!(email = %config.dev_admin_email, "Seeded development admin");
    Ok(())
}
