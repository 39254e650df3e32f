//! Token bucket with continuous refill.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    tokens: u32,
    /// Start of the partially accumulated token.
    last_refill: Instant,
    tokens_per_sec: f64,
}

impl TokenBucket {
    /// A full bucket of `capacity` tokens refilling `capacity` per `window`.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self::new_at(capacity, window, Instant::now())
    }

    fn new_at(capacity: u32, window: Duration, now: Instant) -> Self {
        Self {
            capacity,
            tokens: capacity,
            last_refill: now,
            tokens_per_sec: capacity as f64 / window.as_secs_f64().max(f64::EPSILON),
        }
    }

    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Time until the next token is available.
    pub fn retry_after(&mut self) -> Duration {
        self.retry_after_at(Instant::now())
    }

    fn retry_after_at(&mut self, now: Instant) -> Duration {
        self.refill(now);
        if self.tokens > 0 || self.tokens_per_sec <= 0.0 {
            return Duration::ZERO;
        }
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        Duration::from_secs_f64((1.0 / self.tokens_per_sec - elapsed).max(0.0))
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        let whole = (elapsed * self.tokens_per_sec) as u32;
        if whole == 0 {
            return;
        }

        self.tokens = self.capacity.min(self.tokens.saturating_add(whole));
        if self.tokens == self.capacity {
            self.last_refill = now;
        } else {
            // Keep the fractional progress towards the next token.
            self.last_refill += Duration::from_secs_f64(whole as f64 / self.tokens_per_sec);
        }
    }
}
