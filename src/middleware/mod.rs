mod auth;
mod error_handler;
mod rate_limit;

pub use auth::{admin_auth, member_auth, user_auth};
pub use error_handler::log_errors;
pub use rate_limit::{RateLimiter, rate_limit};
