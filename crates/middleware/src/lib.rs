pub mod api;
pub mod limits;

pub use api::{RequiredRoles, authorize, login_rate_limit, require_auth};
pub use limits::{LoginRateLimiter, RateLimitConfig, RateLimiter};
