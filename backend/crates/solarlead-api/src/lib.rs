// Solarlead API Library
// JSON auth endpoints, health probes and OTP rate limiting

pub mod handlers;
pub mod limiter;
pub mod routes;

pub use limiter::{OtpRateLimiter, RateLimitDecision};
pub use routes::configure_routes;
