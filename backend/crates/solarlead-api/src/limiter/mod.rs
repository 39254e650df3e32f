//! OTP send and verify throttling
//!
//! - [`OtpRateLimiter`]: per client IP and per normalized target
//! - [`TokenBucket`]: continuous-refill bucket behind both limits
//!
//! Buckets live in moka caches, so idle keys expire on their own.

mod otp_limiter;
mod token_bucket;

pub use otp_limiter::{OtpRateLimiter, RateLimitDecision};
pub use token_bucket::TokenBucket;
