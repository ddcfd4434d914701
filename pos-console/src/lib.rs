//! POS admin console service
//!
//! Typed HTTP API and table fragments over a hosted realtime database, file storage and
//! identity service.
//!
//! ```text
//! pos-console/src/
//! ├── hosted/    # database / storage / identity bindings (REST + in-memory)
//! ├── db/        # per-collection CRUD over the hosted database
//! ├── backup/    # backup/restore service + auto-backup worker
//! ├── auth/      # console JWT sessions, login rate limit
//! ├── api/       # axum handlers
//! └── views/     # HTML table fragments
//! ```

pub mod api;
pub mod auth;
pub mod backup;
pub mod config;
pub mod db;
pub mod error;
pub mod hosted;
pub mod logger;
pub mod state;
pub mod views;

pub use api::create_router;
pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
