//! Console sessions and login protection

pub mod console_auth;
pub mod rate_limit;

pub use console_auth::{
    ConsoleClaims, ConsoleIdentity, console_auth_middleware, create_token, require_admin,
};
pub use rate_limit::{RateLimiter, login_rate_limit};
