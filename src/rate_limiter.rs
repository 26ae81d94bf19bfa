//! Sliding-window rate limiting for per-user actions.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Entry untuk rate limiting
#[derive(Clone, Debug)]
struct RateLimitEntry {
    count: u32,
    window_start: DateTime<Utc>,
}

/// Rate limiter dengan sliding window
pub struct RateLimiter {
    /// Map: user_id -> (action -> RateLimitEntry)
    entries: Mutex<HashMap<i64, HashMap<String, RateLimitEntry>>>,
    /// Max requests per window
    max_requests: u32,
    /// Window duration in seconds
    window_seconds: i64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_requests,
            window_seconds,
        }
    }

    /// Check if action is rate limited for user
    /// Returns Ok(()) if allowed, Err(message) if rate limited
    pub fn check(&self, user_id: i64, action: &str) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| "Failed to acquire rate limiter lock")?;

        let now = Utc::now();
        let window_duration = Duration::seconds(self.window_seconds);

        let user_entries = entries.entry(user_id).or_insert_with(HashMap::new);

        let entry = user_entries
            .entry(action.to_string())
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // Window expired: start over
        if now >= entry.window_start + window_duration {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        if entry.count > self.max_requests {
            let retry_after = (entry.window_start + window_duration - now).num_seconds();
            return Err(format!(
                "Rate limit exceeded. Max {} requests per {} seconds. Try again in {} seconds.",
                self.max_requests,
                self.window_seconds,
                retry_after.max(0)
            ));
        }

        Ok(())
    }
}

lazy_static::lazy_static! {
    /// Rate limit untuk simpan kartu: 12 per menit per user
    pub static ref CREATE_CARD_LIMIT: RateLimiter = RateLimiter::new(12, 60);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_enforced_per_user() {
        let limiter = RateLimiter::new(2, 60);
        assert!(limiter.check(1, "CARD_CREATE").is_ok());
        assert!(limiter.check(1, "CARD_CREATE").is_ok());
        assert!(limiter.check(1, "CARD_CREATE").is_err());
        // Another user has their own window
        assert!(limiter.check(2, "CARD_CREATE").is_ok());
    }

    #[test]
    fn test_actions_are_tracked_separately() {
        let limiter = RateLimiter::new(1, 60);
        assert!(limiter.check(1, "A").is_ok());
        assert!(limiter.check(1, "B").is_ok());
        assert!(limiter.check(1, "A").is_err());
    }
}
