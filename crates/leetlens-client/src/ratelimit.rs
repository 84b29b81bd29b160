//! Sliding-window rate limiter for outbound requests.
//!
//! Keeps the timestamps of requests admitted within the trailing window and
//! suspends callers until both constraints hold:
//!
//! - no more than `max_requests` admissions inside any `window`
//! - at least `min_spacing` between two consecutive admissions
//!
//! Admission is serialized through a FIFO-fair async mutex that stays held
//! across the wait, so callers are admitted in arrival order. The timestamp
//! is appended only after every wait has completed; a caller dropped while
//! waiting leaves no trace in the window.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default number of requests allowed per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 20;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(30);

/// Default minimum delay between consecutive requests.
pub const DEFAULT_MIN_SPACING: Duration = Duration::from_millis(200);

/// Rate limit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed within one window.
    pub max_requests: u32,
    /// Length of the sliding window.
    pub window: Duration,
    /// Fixed delay applied before every admission.
    pub min_spacing: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
            min_spacing: DEFAULT_MIN_SPACING,
        }
    }
}

impl RateLimitConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window capacity.
    pub fn with_max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Set the window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set the minimum spacing between requests.
    pub fn with_min_spacing(mut self, min_spacing: Duration) -> Self {
        self.min_spacing = min_spacing;
        self
    }

    /// Reject configurations that would never admit anything.
    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(Error::Config(
                "rate limit max_requests must be at least 1".to_string(),
            ));
        }
        if self.window.is_zero() {
            return Err(Error::Config(
                "rate limit window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Limiter
// ─────────────────────────────────────────────────────────────────────────────

/// Sliding-window request limiter with a minimum inter-request spacing.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Admission instants inside the trailing window, oldest first.
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter. The configuration is validated.
    pub fn new(config: RateLimitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            timestamps: Mutex::new(VecDeque::with_capacity(config.max_requests as usize)),
        })
    }

    /// Get the limiter configuration.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until a request may be issued, then record it.
    ///
    /// Returns the total time the caller was suspended.
    pub async fn admit(&self) -> Duration {
        let started = Instant::now();
        let mut timestamps = self.timestamps.lock().await;

        let now = Instant::now();
        self.prune(&mut timestamps, now);

        if timestamps.len() >= self.config.max_requests as usize {
            if let Some(&oldest) = timestamps.front() {
                let wait = self
                    .config
                    .window
                    .saturating_sub(now.duration_since(oldest));
                if !wait.is_zero() {
                    tracing::info!(
                        wait_ms = wait.as_millis() as u64,
                        in_window = timestamps.len(),
                        "Rate limit reached, waiting"
                    );
                    sleep(wait).await;
                }
            }
        }

        sleep(self.config.min_spacing).await;

        let admitted_at = Instant::now();
        self.prune(&mut timestamps, admitted_at);
        timestamps.push_back(admitted_at);

        let waited = admitted_at.duration_since(started);
        tracing::trace!(
            waited_ms = waited.as_millis() as u64,
            in_window = timestamps.len(),
            "Request admitted"
        );
        waited
    }

    /// Number of admissions currently inside the window.
    pub async fn in_window(&self) -> usize {
        let mut timestamps = self.timestamps.lock().await;
        self.prune(&mut timestamps, Instant::now());
        timestamps.len()
    }

    /// Snapshot of the recorded admission instants, oldest first.
    pub async fn timestamps(&self) -> Vec<Instant> {
        self.timestamps.lock().await.iter().copied().collect()
    }

    /// Forget every recorded admission.
    pub async fn reset(&self) {
        self.timestamps.lock().await.clear();
    }

    /// Drop timestamps that have left the window as of `now`.
    fn prune(&self, timestamps: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = timestamps.front() {
            if now.duration_since(oldest) >= self.config.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}
