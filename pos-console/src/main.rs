//! pos-console server binary

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use pos_console::backup::AutoBackupWorker;
use pos_console::{AppState, Config, create_router, logger};
use tokio_util::sync::CancellationToken;

const RATE_LIMIT_CLEANUP_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    logger::init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    if let Some(dir) = config.log_dir.as_deref() {
        match logger::cleanup_old_logs(std::path::Path::new(dir)) {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, "Removed old log files"),
            Err(e) => tracing::warn!(error = %e, "Failed to clean old log files"),
        }
    }

    tracing::info!(
        environment = %config.environment,
        backend = ?config.backend,
        "Starting pos-console"
    );

    let state = AppState::new(&config).await?;
    let shutdown = CancellationToken::new();

    // Periodic rate limiter cleanup
    let rate_limiter = state.rate_limiter.clone();
    let cleanup_token = shutdown.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(RATE_LIMIT_CLEANUP_SECS));
        loop {
            tokio::select! {
                _ = interval.tick() => rate_limiter.cleanup().await,
                _ = cleanup_token.cancelled() => return,
            }
        }
    });

    let worker = if config.auto_backup_interval_hours > 0 {
        let worker = AutoBackupWorker::new(
            state.db.clone(),
            state.backups.clone(),
            Duration::from_secs(config.auto_backup_interval_hours * 3600),
            config.auto_backup_keep,
            config.activity_retention_days,
            shutdown.clone(),
        );
        Some(tokio::spawn(worker.run()))
    } else {
        tracing::info!("Automatic backups disabled");
        None
    };

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("pos-console listening on {addr}");

    let server_token = shutdown.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
            _ = server_token.cancelled() => {}
        }
    })
    .await?;

    shutdown.cancel();
    if let Some(handle) = worker
        && let Err(e) = handle.await
    {
        tracing::error!("Auto backup worker panicked: {e}");
    }

    tracing::info!("pos-console stopped");
    Ok(())
}
