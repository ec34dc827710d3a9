pub mod auth;
pub mod rate_limit;

pub use auth::{require_same_user, require_session};
pub use rate_limit::create_ip_rate_limiter;
