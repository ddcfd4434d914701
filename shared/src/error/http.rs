//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::BackupNotFound
            | Self::ProductNotFound
            | Self::CustomerNotFound
            | Self::InvoiceNotFound
            | Self::SalaryNotFound
            | Self::BranchNotFound
            | Self::EmployeeNotFound
            | Self::UserNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::ProductSkuExists
            | Self::SalaryAlreadyRecorded
            | Self::BranchHasEmployees
            | Self::UsernameExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::AdminRequired | Self::CannotModifySelf => {
                StatusCode::FORBIDDEN
            }

            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway (hosted service failed or answered garbage)
            Self::BackupUploadFailed | Self::BackupDownloadFailed | Self::StorageError => {
                StatusCode::BAD_GATEWAY
            }

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
