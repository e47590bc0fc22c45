//! Failed-login throttling, keyed by normalised email

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failed attempts tolerated inside one window
    pub max_failures: u32,
    /// Window in seconds, counted from the first failure
    pub window_seconds: u64,
    /// Lockout once the limit is hit
    pub lockout_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window_seconds: 300,
            lockout_seconds: 900,
        }
    }
}

#[derive(Debug)]
struct Entry {
    failures: u32,
    window_start: Instant,
    locked_until: Option<Instant>,
}

/// In-process limiter; state is per auth instance
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn normalise(key: &str) -> String {
        key.trim().to_lowercase()
    }

    /// Whether the key is currently locked out
    pub async fn is_locked(&self, key: &str) -> bool {
        self.is_locked_at(key, Instant::now()).await
    }

    async fn is_locked_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(&Self::normalise(key)) else {
            return false;
        };

        match entry.locked_until {
            Some(until) if now < until => true,
            Some(_) => {
                entry.failures = 0;
                entry.locked_until = None;
                entry.window_start = now;
                false
            }
            None => false,
        }
    }

    /// Record a failed attempt; returns true when this failure triggers a lockout
    pub async fn record_failure(&self, key: &str) -> bool {
        self.record_failure_at(key, Instant::now()).await
    }

    async fn record_failure_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;
        let key = Self::normalise(key);
        let entry = entries.entry(key.clone()).or_insert(Entry {
            failures: 0,
            window_start: now,
            locked_until: None,
        });

        if now.duration_since(entry.window_start) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.failures = 0;
            entry.window_start = now;
        }

        entry.failures += 1;

        if entry.failures >= self.config.max_failures {
            entry.locked_until = Some(now + Duration::from_secs(self.config.lockout_seconds));
            warn!(
                "Locked out {} for {} seconds after {} failed logins",
                key, self.config.lockout_seconds, entry.failures
            );
            return true;
        }

        false
    }

    /// Forget a key after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(&Self::normalise(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_failures: 3,
            window_seconds: 60,
            lockout_seconds: 120,
        })
    }

    #[tokio::test]
    async fn test_locks_after_max_failures() {
        let limiter = limiter();
        let now = Instant::now();

        assert!(!limiter.record_failure_at("ana@example.com", now).await);
        assert!(!limiter.record_failure_at("ANA@example.com ", now).await);
        assert!(limiter.record_failure_at("ana@example.com", now).await);

        assert!(limiter.is_locked_at("ana@example.com", now).await);
        assert!(!limiter.is_locked_at("bia@example.com", now).await);
    }

    #[tokio::test]
    async fn test_lockout_expires() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..3 {
            limiter.record_failure_at("ana@example.com", now).await;
        }

        let later = now + Duration::from_secs(121);
        assert!(!limiter.is_locked_at("ana@example.com", later).await);
        assert!(!limiter.record_failure_at("ana@example.com", later).await);
    }

    #[tokio::test]
    async fn test_window_resets_failures() {
        let limiter = limiter();
        let now = Instant::now();

        limiter.record_failure_at("ana@example.com", now).await;
        limiter.record_failure_at("ana@example.com", now).await;

        let later = now + Duration::from_secs(61);
        assert!(!limiter.record_failure_at("ana@example.com", later).await);
    }

    #[tokio::test]
    async fn test_reset_clears_history() {
        let limiter = limiter();
        limiter.record_failure("ana@example.com").await;
        limiter.record_failure("ana@example.com").await;
        limiter.reset("ana@example.com").await;

        assert!(!limiter.record_failure("ana@example.com").await);
    }
}
