//! Data models
//!
//! Records stored in the hosted database use camelCase field names. The database key is
//! not stored inside the record; it is injected as `id` when reading (see
//! [`crate::snapshot::Snapshot::records`]).

pub mod activity;
pub mod backup;
pub mod branch;
pub mod customer;
pub mod employee;
pub mod invoice;
pub mod product;
pub mod salary;
pub mod settings;
pub mod status;
pub mod user;

// Re-exports
pub use activity::*;
pub use backup::*;
pub use branch::*;
pub use customer::*;
pub use employee::*;
pub use invoice::*;
pub use product::*;
pub use salary::*;
pub use settings::*;
pub use status::*;
pub use user::*;
