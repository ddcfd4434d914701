//! Console server configuration

use std::net::IpAddr;

use shared::error::{AppError, ErrorCode};

/// Which hosted backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Vendor REST APIs
    Rest,
    /// In-process tree, for local development and tests
    Memory,
}

/// Console server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    pub backend: BackendKind,
    /// Realtime database base URL
    pub database_url: String,
    /// Database secret / access token (sent as `auth`)
    pub database_auth_token: Option<String>,
    /// File storage bucket for backup files
    pub storage_bucket: String,
    /// Web API key of the identity service
    pub identity_api_key: String,
    /// JWT secret for console sessions
    pub jwt_secret: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// Hours between automatic backups (0 = off)
    pub auto_backup_interval_hours: u64,
    /// Automatic backups kept after pruning
    pub auto_backup_keep: usize,
    /// Activity entries older than this many days are purged (0 = keep all)
    pub activity_retention_days: u64,
    /// Symbol used when rendering money in table fragments
    pub currency_symbol: String,
    /// Peers whose `X-Forwarded-For` header is believed
    pub trusted_proxies: Vec<IpAddr>,
    /// Seed admin for the memory backend
    pub dev_admin_email: String,
    pub dev_admin_password: String,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Comma-separated IP list; blank entries ignored
fn parse_ip_list(name: &str, raw: &str) -> Result<Vec<IpAddr>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| config_error(format!("{name} contains an invalid IP address: '{s}'")))
        })
        .collect()
}

fn config_error(message: String) -> AppError {
    AppError::with_message(ErrorCode::ConfigError, message)
}

impl Config {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, AppError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(config_error(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(config_error(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let environment = env_or("ENVIRONMENT", "development");

        let backend = match env_or("HOSTED_BACKEND", "rest").as_str() {
            "rest" => BackendKind::Rest,
            "memory" => BackendKind::Memory,
            other => {
                return Err(config_error(format!(
                    "HOSTED_BACKEND must be 'rest' or 'memory', got '{other}'"
                )));
            }
        };
        if backend == BackendKind::Memory && environment == "production" {
            return Err(config_error(
                "HOSTED_BACKEND=memory is not allowed in production".into(),
            ));
        }

        let (database_url, storage_bucket, identity_api_key) = match backend {
            BackendKind::Rest => (
                std::env::var("DATABASE_URL")
                    .map_err(|_| config_error("DATABASE_URL must be set".into()))?,
                std::env::var("STORAGE_BUCKET")
                    .map_err(|_| config_error("STORAGE_BUCKET must be set".into()))?,
                Self::require_secret("IDENTITY_API_KEY", &environment)?,
            ),
            BackendKind::Memory => (String::new(), String::new(), String::new()),
        };

        let config = Self {
            http_port: env_parse("HTTP_PORT", 8080),
            backend,
            database_url,
            database_auth_token: std::env::var("DATABASE_AUTH_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            storage_bucket,
            identity_api_key,
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            log_level: env_or("LOG_LEVEL", "info"),
            log_json: env_parse("LOG_JSON", environment == "production"),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            auto_backup_interval_hours: env_parse("AUTO_BACKUP_INTERVAL_HOURS", 0),
            auto_backup_keep: env_parse("AUTO_BACKUP_KEEP", 7),
            activity_retention_days: env_parse("ACTIVITY_RETENTION_DAYS", 0),
            currency_symbol: env_or("CURRENCY_SYMBOL", "$"),
            dev_admin_email: env_or("DEV_ADMIN_EMAIL", "admin@pos.local"),
            dev_admin_password: env_or("DEV_ADMIN_PASSWORD", "admin123"),
            trusted_proxies: parse_ip_list("TRUSTED_PROXIES", &env_or("TRUSTED_PROXIES", ""))?,
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that `from_env` applies after parsing
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auto_backup_interval_hours > 0 && self.auto_backup_keep == 0 {
            return Err(config_error(
                "AUTO_BACKUP_KEEP must be at least 1 when AUTO_BACKUP_INTERVAL_HOURS is set".into(),
            ));
        }
        Ok(())
    }

    /// Development config on the memory backend
    pub fn for_memory() -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            backend: BackendKind::Memory,
            database_url: String::new(),
            database_auth_token: None,
            storage_bucket: String::new(),
            identity_api_key: String::new(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            auto_backup_interval_hours: 0,
            auto_backup_keep: 7,
            activity_retention_days: 0,
            currency_symbol: "$".into(),
            dev_admin_email: "admin@pos.local".into(),
            dev_admin_password: "admin123".into(),
            trusted_proxies: Vec::new(),
        }
    }
}
