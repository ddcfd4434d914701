//! Unified service-layer error type for pos-console
//!
//! `ServiceError` bridges hosted-backend failures (`HostedError`) and the API-layer error
//! (`AppError`), so handlers and services can use `?` across both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::hosted::HostedError;

/// Service-layer error
///
/// - `Hosted`: hosted database/storage/identity failure (logged, mapped to a system code)
/// - `App`: business-rule error (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Hosted(HostedError),
    App(AppError),
}

impl From<HostedError> for ServiceError {
    fn from(e: HostedError) -> Self {
        ServiceError::Hosted(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<HostedError> for AppError {
    fn from(e: HostedError) -> Self {
        match e {
            HostedError::NotFound(path) => {
                tracing::warn!(path = %path, "Hosted resource not found");
                AppError::not_found(path)
            }
            HostedError::Auth(reason) => {
                tracing::debug!(reason = %reason, "Hosted sign-in rejected");
                AppError::invalid_credentials()
            }
            HostedError::Transport(err) if err.is_timeout() => {
                tracing::error!(error = %err, "Hosted service timed out");
                AppError::new(ErrorCode::TimeoutError)
            }
            HostedError::Transport(err) => {
                tracing::error!(error = %err, "Hosted service unreachable");
                AppError::new(ErrorCode::NetworkError)
            }
            HostedError::Status { status, message } => {
                tracing::error!(status, message = %message, "Hosted service error");
                AppError::database(message).with_detail("status", status)
            }
            HostedError::Decode(message) | HostedError::InvalidPath(message) => {
                tracing::error!(message = %message, "Hosted request failed");
                AppError::database(message)
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Hosted(hosted_err) => hosted_err.into(),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Hosted(e) => write!(f, "{e}"),
            ServiceError::App(e) => write!(f, "{e}"),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
