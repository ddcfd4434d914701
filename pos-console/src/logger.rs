//! Logging setup
//!
//! - Console output, pretty in development and JSON in production
//! - Optional daily rolling application logs under `{log_dir}/app` (deleted after 14 days)
//! - Security events (target `security`) go to `{log_dir}/security` and are never deleted

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

const APP_LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Remove `app.YYYY-MM-DD` files older than the retention window
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(date_part) = name.strip_prefix("app.")
            && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }
    Ok(removed)
}

fn file_layer(dir: PathBuf, prefix: &str, json: bool, security: bool) -> BoxedLayer {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, prefix);
    let only_security = tracing_subscriber::filter::filter_fn(move |meta| {
        (meta.target() == "security") == security
    });
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(appender));
    if json {
        layer.json().with_filter(only_security).boxed()
    } else {
        layer.with_filter(only_security).boxed()
    }
}

/// Initialize the logging system
///
/// `RUST_LOG` overrides `level` when set.
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if json_format {
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    }

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join("app");
        let security_log_dir = log_dir.join("security");
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&security_log_dir)?;

        layers.push(file_layer(app_log_dir, "app", json_format, false));
        layers.push(file_layer(security_log_dir, "security", json_format, true));

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Hourly cleanup of old application logs
async fn periodic_cleanup(log_dir: PathBuf) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
    loop {
        interval.tick().await;
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Security event: failed sign-ins, rate limiting, permission denials
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(target: "security", event = $event, $($arg)*)
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: "security", event = $event, $($arg)*)
    };
}
