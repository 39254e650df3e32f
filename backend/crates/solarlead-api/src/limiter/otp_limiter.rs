//! OTP limiter keyed by client IP and by target
//!
//! Sends and verify attempts have separate budgets. Both the client and the
//! target budget must admit a request. A limit of 0 disables that check.

use super::token_bucket::TokenBucket;
use moka::sync::Cache;
use solarlead_auth::OtpTarget;
use solarlead_commons::ConnectionInfo;
use solarlead_configs::AuthSettings;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const IP_WINDOW: Duration = Duration::from_secs(60);
const TARGET_WINDOW: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

/// Token buckets for one limit, created on first use.
struct Budget {
    limit: u32,
    window: Duration,
    buckets: Cache<Arc<str>, Arc<Mutex<TokenBucket>>>,
}

impl Budget {
    fn new(limit: u32, window: Duration, max_entries: u64) -> Self {
        // An idle bucket has refilled completely once its window has passed.
        let buckets = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(window)
            .build();
        Self {
            limit,
            window,
            buckets,
        }
    }

    fn take(&self, key: &str) -> RateLimitDecision {
        if self.limit == 0 {
            return RateLimitDecision::Allowed;
        }

        let bucket = self
            .buckets
            .get_with(Arc::from(key), || Arc::new(Mutex::new(TokenBucket::new(self.limit, self.window))));
        let mut guard = bucket.lock().expect("Rate limiter mutex poisoned");
        if guard.try_acquire() {
            RateLimitDecision::Allowed
        } else {
            RateLimitDecision::Limited {
                retry_after: guard.retry_after(),
            }
        }
    }
}

pub struct OtpRateLimiter {
    max_entries: u64,
    send_ip: Budget,
    send_target: Budget,
    verify_ip: Budget,
    verify_target: Budget,
}

impl OtpRateLimiter {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            settings.otp_sends_per_ip_per_minute,
            settings.otp_sends_per_target_per_hour,
            settings.rate_limit_cache_max_entries,
        )
        .with_verify_limits(
            settings.otp_verifies_per_ip_per_minute,
            settings.otp_verifies_per_target_per_hour,
        )
    }

    /// Send limits as given; verify limits from the default settings.
    pub fn new(per_ip: u32, per_target: u32, max_entries: u64) -> Self {
        let defaults = AuthSettings::default();
        Self {
            max_entries,
            send_ip: Budget::new(per_ip, IP_WINDOW, max_entries),
            send_target: Budget::new(per_target, TARGET_WINDOW, max_entries),
            verify_ip: Budget::new(defaults.otp_verifies_per_ip_per_minute, IP_WINDOW, max_entries),
            verify_target: Budget::new(defaults.otp_verifies_per_target_per_hour, TARGET_WINDOW, max_entries),
        }
    }

    pub fn with_verify_limits(mut self, per_ip: u32, per_target: u32) -> Self {
        self.verify_ip = Budget::new(per_ip, IP_WINDOW, self.max_entries);
        self.verify_target = Budget::new(per_target, TARGET_WINDOW, self.max_entries);
        self
    }

    /// Take one send from both the client and the target budget.
    pub fn check_send(&self, connection: &ConnectionInfo, target: &OtpTarget) -> RateLimitDecision {
        Self::check(&self.send_ip, &self.send_target, connection, target)
    }

    /// Take one code guess from both the client and the target budget.
    pub fn check_verify(&self, connection: &ConnectionInfo, target: &OtpTarget) -> RateLimitDecision {
        Self::check(&self.verify_ip, &self.verify_target, connection, target)
    }

    fn check(
        per_ip: &Budget,
        per_target: &Budget,
        connection: &ConnectionInfo,
        target: &OtpTarget,
    ) -> RateLimitDecision {
        if let RateLimitDecision::Limited { retry_after } = per_ip.take(connection.client_key()) {
            return RateLimitDecision::Limited { retry_after };
        }
        per_target.take(target.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(ip: &str) -> ConnectionInfo {
        ConnectionInfo::new(Some(ip.to_string()))
    }

    fn phone(number: &str) -> OtpTarget {
        OtpTarget::Phone(number.to_string())
    }

    #[test]
    fn test_per_ip_limit() {
        let limiter = OtpRateLimiter::new(2, 100, 1000);
        let ip = client("203.0.113.7");

        assert!(limiter.check_send(&ip, &phone("+919800000001")).is_allowed());
        assert!(limiter.check_send(&ip, &phone("+919800000002")).is_allowed());
        let decision = limiter.check_send(&ip, &phone("+919800000003"));
        match decision {
            RateLimitDecision::Limited { retry_after } => assert!(retry_after <= IP_WINDOW),
            RateLimitDecision::Allowed => panic!("third send from one IP should be limited"),
        }

        assert!(limiter
            .check_send(&client("198.51.100.1"), &phone("+919800000003"))
            .is_allowed());
    }

    #[test]
    fn test_per_target_limit_across_ips() {
        let limiter = OtpRateLimiter::new(100, 2, 1000);
        let target = OtpTarget::Email("asha@example.in".to_string());

        assert!(limiter.check_send(&client("10.0.0.1"), &target).is_allowed());
        assert!(limiter.check_send(&client("10.0.0.2"), &target).is_allowed());
        assert!(!limiter.check_send(&client("10.0.0.3"), &target).is_allowed());
    }

    #[test]
    fn test_zero_disables_limit() {
        let limiter = OtpRateLimiter::new(0, 0, 1000);
        let ip = client("10.0.0.1");
        for _ in 0..50 {
            assert!(limiter.check_send(&ip, &phone("+919800000001")).is_allowed());
        }
    }

    #[test]
    fn test_verify_limits_per_ip_and_per_target() {
        let limiter = OtpRateLimiter::new(100, 100, 1000).with_verify_limits(3, 2);
        let ip = client("203.0.113.7");

        assert!(limiter.check_verify(&ip, &phone("+919800000001")).is_allowed());
        assert!(limiter.check_verify(&ip, &phone("+919800000001")).is_allowed());
        match limiter.check_verify(&client("198.51.100.1"), &phone("+919800000001")) {
            RateLimitDecision::Limited { retry_after } => assert!(retry_after <= TARGET_WINDOW),
            RateLimitDecision::Allowed => panic!("third guess at one target should be limited"),
        }

        assert!(limiter.check_verify(&ip, &phone("+919800000002")).is_allowed());
        assert!(!limiter.check_verify(&ip, &phone("+919800000003")).is_allowed());
    }

    #[test]
    fn test_verify_and_send_budgets_are_separate() {
        let limiter = OtpRateLimiter::new(1, 1, 1000).with_verify_limits(1, 1);
        let ip = client("10.0.0.1");
        let target = phone("+919800000001");

        assert!(limiter.check_send(&ip, &target).is_allowed());
        assert!(limiter.check_verify(&ip, &target).is_allowed());
        assert!(!limiter.check_send(&ip, &target).is_allowed());
        assert!(!limiter.check_verify(&ip, &target).is_allowed());
    }

    #[test]
    fn test_default_verify_limits_apply() {
        let limiter = OtpRateLimiter::from_settings(&AuthSettings::default());
        let ip = client("10.0.0.9");
        let target = phone("+919800000009");
        let allowed = (0..20).filter(|_| limiter.check_verify(&ip, &target).is_allowed()).count();
        assert_eq!(allowed, 10);
    }

    #[test]
    fn test_missing_address_shares_a_bucket() {
        let limiter = OtpRateLimiter::new(1, 100, 1000);
        let unknown = ConnectionInfo::new(None);

        assert!(limiter.check_send(&unknown, &phone("+919800000001")).is_allowed());
        assert!(!limiter.check_send(&unknown, &phone("+919800000002")).is_allowed());
    }
}
