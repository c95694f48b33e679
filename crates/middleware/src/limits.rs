use shop_error::{AppError, AppResult};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Structure to track rate limited attempts
#[derive(Debug, Clone)]
struct RateLimitEntry {
    attempts: usize,
    first_attempt: Instant,
}

impl RateLimitEntry {
    fn first(now: Instant) -> Self {
        Self {
            attempts: 1,
            first_attempt: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_attempts: usize,
    pub window_duration: Duration,
    /// Fixed rejection message; deliberately carries no timing detail.
    pub message: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_duration: Duration::from_secs(900),
            message: "Too many attempts. Please try again later.".into(),
        }
    }
}

/// Generic sliding-window rate limiter keyed by an identifier type.
///
/// Every `check` call counts as an attempt. Counters live behind a single
/// async RwLock, so concurrent requests from one client cannot lose updates.
#[derive(Debug, Clone)]
pub struct RateLimiter<T: Eq + Hash + Clone + Send + Sync + Debug + 'static> {
    attempts: Arc<RwLock<HashMap<T, RateLimitEntry>>>,
    config: RateLimitConfig,
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl<T: Eq + Hash + Clone + Send + Sync + Debug + 'static> RateLimiter<T> {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
            config,
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Record an attempt for `identifier` and reject once the allowance for
    /// the current window is spent.
    pub async fn check(&self, identifier: &T) -> AppResult<()> {
        let mut attempts = self.attempts.write().await;
        let now = Instant::now();

        self.cleanup(&mut attempts, now).await;

        match attempts.get_mut(identifier) {
            Some(entry) => {
                if now.duration_since(entry.first_attempt) >= self.config.window_duration {
                    // Window expired: this attempt opens a fresh one.
                    *entry = RateLimitEntry::first(now);
                    return Ok(());
                }

                entry.attempts += 1;
                if entry.attempts > self.config.max_attempts {
                    return Err(AppError::RateLimitError(self.config.message.clone()));
                }

                Ok(())
            }
            None => {
                attempts.insert(identifier.clone(), RateLimitEntry::first(now));
                Ok(())
            }
        }
    }

    /// Snapshot for `X-RateLimit-*` response headers.
    pub async fn status(&self, identifier: &T) -> RateLimitStatus {
        let attempts = self.attempts.read().await;
        let now = Instant::now();

        if let Some(entry) = attempts.get(identifier) {
            let elapsed = now.duration_since(entry.first_attempt);
            if elapsed < self.config.window_duration {
                return RateLimitStatus {
                    limit: self.config.max_attempts,
                    remaining: self.config.max_attempts.saturating_sub(entry.attempts),
                    window_reset: (self.config.window_duration - elapsed).as_secs(),
                };
            }
        }

        RateLimitStatus {
            limit: self.config.max_attempts,
            remaining: self.config.max_attempts,
            window_reset: 0,
        }
    }

    async fn cleanup(&self, attempts: &mut HashMap<T, RateLimitEntry>, now: Instant) {
        let mut last_cleanup = self.last_cleanup.write().await;

        if now.duration_since(*last_cleanup) >= self.cleanup_interval {
            attempts
                .retain(|_, entry| now.duration_since(entry.first_attempt) < self.config.window_duration);
            *last_cleanup = now;
        }
    }
}

/// Status information about rate limiting for an identifier
#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    pub limit: usize,
    pub remaining: usize,
    pub window_reset: u64,
}

/// Login rate limiter keyed by originating-client identifier.
pub type LoginRateLimiter = RateLimiter<String>;

pub fn create_login_rate_limiter(max_attempts: usize, window_duration: Duration) -> LoginRateLimiter {
    let config = RateLimitConfig {
        max_attempts,
        window_duration,
        message: "Too many login attempts. Please try again later.".into(),
    };

    LoginRateLimiter::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::test;
    use tokio::time::sleep;

    #[test]
    async fn allowance_is_spent_then_rejected() {
        let limiter = create_login_rate_limiter(5, Duration::from_secs(60));
        let client = "203.0.113.7".to_string();

        for _ in 0..5 {
            assert!(limiter.check(&client).await.is_ok());
        }

        match limiter.check(&client).await {
            Err(AppError::RateLimitError(msg)) => {
                assert_eq!(msg, "Too many login attempts. Please try again later.");
            }
            _ => panic!("Expected RateLimitError"),
        }

        // Still rejected while inside the window.
        assert!(limiter.check(&client).await.is_err());
    }

    #[test]
    async fn window_expiry_readmits_the_client() {
        let config = RateLimitConfig {
            max_attempts: 2,
            window_duration: Duration::from_millis(50),
            message: "Too many attempts.".into(),
        };
        let limiter = RateLimiter::new(config);
        let client = "client".to_string();

        assert!(limiter.check(&client).await.is_ok());
        assert!(limiter.check(&client).await.is_ok());
        assert!(limiter.check(&client).await.is_err());

        sleep(Duration::from_millis(60)).await;

        assert!(limiter.check(&client).await.is_ok());
    }

    #[test]
    async fn clients_are_limited_independently() {
        let limiter = create_login_rate_limiter(1, Duration::from_secs(60));

        let first = "198.51.100.1".to_string();
        let second = "198.51.100.2".to_string();

        assert!(limiter.check(&first).await.is_ok());
        assert!(limiter.check(&first).await.is_err());
        assert!(limiter.check(&second).await.is_ok());
    }

    #[test]
    async fn status_reports_remaining_allowance() {
        let limiter = create_login_rate_limiter(5, Duration::from_secs(60));
        let client = "client".to_string();

        let status = limiter.status(&client).await;
        assert_eq!(status.remaining, 5);

        limiter.check(&client).await.unwrap();
        limiter.check(&client).await.unwrap();

        let status = limiter.status(&client).await;
        assert_eq!(status.limit, 5);
        assert_eq!(status.remaining, 3);
        assert!(status.window_reset > 0);
    }
}
