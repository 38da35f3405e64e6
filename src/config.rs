//! Timing and endpoint configuration for the auth coordinator.
//!
//! DESIGN
//! ======
//! Browser builds have no process environment, so defaults are constants and
//! the API base URL is taken from `BOARD_AUTH_API_URL` at compile time.
//! Tests shrink or stretch individual timings through the `with_*` builders.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_LOCK_POLL_INTERVAL_MS: u64 = 100;
const DEFAULT_LOCK_WAIT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CACHE_EXPIRY_MS: u64 = 300_000;
const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
const DEFAULT_MAX_RETRIES: u32 = 3;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Persisted storage keys shared by every coordinator on the same origin.
pub mod keys {
    /// Authenticated marker, written to both scopes.
    pub const AUTH_STATE: &str = "auth_state";
    /// Cached user profile, short-lived scope only.
    pub const USER_CACHE: &str = "user_cache";
    /// Initialization lease, short-lived scope only.
    pub const AUTH_LOCK: &str = "auth_lock";
    /// Epoch-ms of the last confirmed auth check.
    pub const LAST_CHECK: &str = "last_auth_check";
}

/// Timing knobs for locking, caching and OAuth reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    /// Age after which a lock record is considered abandoned.
    pub lock_timeout: Duration,
    /// Poll interval while waiting for another initializer.
    pub lock_poll_interval: Duration,
    /// Upper bound on waiting for another initializer before proceeding.
    pub lock_wait_timeout: Duration,
    /// TTL for the cached marker and user, and for the last-check stamp.
    pub cache_expiry: Duration,
    /// Base delay for the OAuth reconciliation backoff.
    pub retry_delay: Duration,
    /// Attempts made by the OAuth reconciliation loop.
    pub max_retries: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            lock_poll_interval: Duration::from_millis(DEFAULT_LOCK_POLL_INTERVAL_MS),
            lock_wait_timeout: Duration::from_millis(DEFAULT_LOCK_WAIT_TIMEOUT_MS),
            cache_expiry: Duration::from_millis(DEFAULT_CACHE_EXPIRY_MS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_lock_wait(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.lock_poll_interval = poll_interval;
        self.lock_wait_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_cache_expiry(mut self, expiry: Duration) -> Self {
        self.cache_expiry = expiry;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Delay before OAuth reconciliation attempt `attempt` (1-based).
    ///
    /// The first attempt runs immediately; attempt k > 1 waits `retry_delay * k`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.retry_delay * attempt
        }
    }
}

/// REST endpoint configuration for [`crate::net::api::HttpAuthService`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthApiConfig {
    pub base_url: String,
}

impl Default for AuthApiConfig {
    fn default() -> Self {
        Self::new(option_env!("BOARD_AUTH_API_URL").unwrap_or(DEFAULT_API_URL))
    }
}

impl AuthApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Join `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
