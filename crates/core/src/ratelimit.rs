//! Request rate limiting.
//!
//! The server holds one [`RateLimiter`] trait object for its whole lifetime.
//! [`FixedWindowRateLimiter`] keeps counters in process memory; a shared
//! backend can implement the same trait.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The request may proceed.
    Allow,
    /// The request is rejected until `retry_after` has elapsed.
    Deny {
        /// Time until the current window ends.
        retry_after: Duration,
    },
}

impl RateDecision {
    /// Returns true for [`RateDecision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether a client may make another request.
pub trait RateLimiter: Send + Sync {
    /// Records a request for `key` and returns the decision.
    fn check(&self, key: &str) -> RateDecision;
}

/// On average one check in this many sweeps expired windows.
const CLEANUP_ONE_IN: u32 = 100;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter keyed by client.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl FixedWindowRateLimiter {
    /// Allows `max_requests` per `window` for each key.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Check as of `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        if rand::random::<u32>() % CLEANUP_ONE_IN == 0 {
            self.purge_expired(now);
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            debug!(key, count = entry.count, ?retry_after, "Rate limit exceeded");
            return RateDecision::Deny { retry_after };
        }

        entry.count += 1;
        RateDecision::Allow
    }

    /// Drops windows that ended before `now`.
    pub fn purge_expired(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit_then_denies() {
        let limiter = FixedWindowRateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("client", now).is_allowed());
        assert!(limiter.check_at("client", now).is_allowed());

        match limiter.check_at("client", now + Duration::from_secs(10)) {
            RateDecision::Deny { retry_after } => assert_eq!(retry_after, Duration::from_secs(50)),
            RateDecision::Allow => panic!("third request should be denied"),
        }
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("a", now).is_allowed());
        assert!(limiter.check_at("b", now).is_allowed());
        assert!(!limiter.check_at("a", now).is_allowed());
    }

    #[test]
    fn test_window_resets() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("client", now).is_allowed());
        assert!(!limiter.check_at("client", now).is_allowed());
        assert!(limiter.check_at("client", now + Duration::from_secs(60)).is_allowed());
    }

    #[test]
    fn test_purge_drops_expired_windows() {
        let limiter = FixedWindowRateLimiter::new(5, Duration::from_secs(1));
        let now = Instant::now();
        limiter.check_at("old", now);
        limiter.check_at("new", now + Duration::from_secs(2));

        limiter.purge_expired(now + Duration::from_secs(2));

        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let limiter: std::sync::Arc<dyn RateLimiter> =
            std::sync::Arc::new(FixedWindowRateLimiter::new(1, Duration::from_secs(60)));
        assert_eq!(limiter.check("k"), RateDecision::Allow);
    }
}
