//! Shared types for the POS admin console
//!
//! Domain models, the unified error system, hosted-database snapshot reshaping, payroll
//! arithmetic and small formatting utilities.

pub mod diff;
pub mod error;
pub mod models;
pub mod payroll;
pub mod snapshot;
pub mod util;
pub mod validation;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use snapshot::Snapshot;
