//! HTTP surface of the console
//!
//! Public: `/health`, `/api/auth/login` (rate limited). Everything else requires a console
//! session; user management, backups, settings writes and activity clearing also
//! require the admin role.

pub mod activity;
pub mod auth;
pub mod backups;
pub mod branches;
pub mod customers;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod invoices;
pub mod payroll;
pub mod products;
pub mod settings;
pub mod users;

use axum::routing::{get, post};
use axum::{Router, middleware};
use serde_json::Value;
use shared::error::AppError;
use shared::models::ActivityAction;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{ConsoleIdentity, console_auth_middleware, login_rate_limit, require_admin};
use crate::db;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Append an activity entry for the acting console user.
///
/// A failed write is logged and does not fail the request.
pub(crate) async fn record_activity(
    state: &AppState,
    identity: &ConsoleIdentity,
    action: ActivityAction,
    target: Option<&str>,
    details: Option<Value>,
) {
    if let Err(e) =
        db::activity::record(state.db.as_ref(), &identity.actor(), action, target, details).await
    {
        tracing::warn!(action = ?action, error = %e, "Failed to record activity");
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let login = Router::new()
        .route("/api/auth/login", post(auth::login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/dashboard", get(dashboard::summary))
        .merge(users::router())
        .merge(branches::router())
        .merge(employees::router())
        .merge(payroll::router())
        .merge(products::router())
        .merge(customers::router())
        .merge(invoices::router())
        .merge(settings::router())
        .merge(backups::router())
        .merge(activity::router())
        .merge(crate::views::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            console_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(login)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Admin-only routes share this guard
pub(crate) fn admin_only(router: Router<AppState>) -> Router<AppState> {
    router.layer(middleware::from_fn(require_admin))
}
