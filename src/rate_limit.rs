//! Per-caller request rate limiting.
//!
//! Each caller identity gets a fixed window that starts with its first
//! request. Up to `max_requests` are admitted inside the window; the window
//! resets once it has fully elapsed.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::LimitsConfig;

/// Configuration for rate limiting.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum requests admitted in one window.
    pub max_requests: u32,
    /// Length of a window.
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a new rate limit configuration.
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl Default for RateLimitConfig {
    /// 10 requests per 15 minutes.
    fn default() -> Self {
        Self::new(10, 15 * 60)
    }
}

impl From<&LimitsConfig> for RateLimitConfig {
    fn from(limits: &LimitsConfig) -> Self {
        Self::new(limits.rate_limit_max_requests, limits.rate_limit_window_secs)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is admitted.
    Allowed {
        /// Requests left in the current window.
        remaining: u32,
        /// Time until the current window ends.
        reset_after: Duration,
    },
    /// Request is rejected.
    Denied {
        /// Time until the current window ends.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    /// Check if the request is admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Request count for one caller.
#[derive(Debug, Clone, Copy)]
struct RateLimitWindow {
    count: u32,
    started: Instant,
}

impl RateLimitWindow {
    fn expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.started) >= window
    }
}

/// Fixed-window rate limiter keyed by caller identity.
///
/// # Example
///
/// ```
/// use formrelay::rate_limit::{RateLimitConfig, WindowRateLimiter};
///
/// let limiter = WindowRateLimiter::new(RateLimitConfig::new(2, 60));
///
/// assert!(limiter.check_and_record("203.0.113.7").is_allowed());
/// assert!(limiter.check_and_record("203.0.113.7").is_allowed());
/// assert!(!limiter.check_and_record("203.0.113.7").is_allowed());
/// assert!(limiter.check_and_record("198.51.100.1").is_allowed());
/// ```
#[derive(Debug)]
pub struct WindowRateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, RateLimitWindow>>,
}

impl WindowRateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count a request from `key` and decide whether it is admitted.
    ///
    /// Rejected requests are not counted.
    pub fn check_and_record(&self, key: &str) -> RateLimitResult {
        self.check_and_record_at(key, Instant::now())
    }

    /// Same as [`check_and_record`](Self::check_and_record) with an explicit clock.
    pub fn check_and_record_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = windows.entry(key.to_string()).or_insert(RateLimitWindow {
            count: 0,
            started: now,
        });

        if entry.expired(now, self.config.window) {
            *entry = RateLimitWindow {
                count: 0,
                started: now,
            };
        }

        let reset_after = self
            .config
            .window
            .saturating_sub(now.saturating_duration_since(entry.started));

        if entry.count >= self.config.max_requests {
            return RateLimitResult::Denied {
                retry_after: reset_after,
            };
        }

        entry.count += 1;
        RateLimitResult::Allowed {
            remaining: self.config.max_requests - entry.count,
            reset_after,
        }
    }

    /// Remove windows that have fully elapsed.
    ///
    /// Returns the number of removed entries.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Same as [`sweep`](Self::sweep) with an explicit clock.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = windows.len();
        let window = self.config.window;
        windows.retain(|_, w| !w.expired(now, window));
        before - windows.len()
    }

    /// Number of tracked caller identities.
    pub fn tracked(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for WindowRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
