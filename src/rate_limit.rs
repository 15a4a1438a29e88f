//! Sliding-window rate limiter with per-key blocking.
//!
//! Each key owns a `Tracker` of request timestamps. A key that exceeds its
//! quota within the rolling window is blocked for the configured cooldown;
//! while blocked, attempts are rejected without being recorded. Idle trackers
//! are reclaimed by a periodic sweep.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tracing::warn;

use crate::config::{ConfigError, RateLimitConfig};

// Per-key tracking record
#[derive(Debug, Default)]
struct Tracker {
    requests: Vec<DateTime<Utc>>,
    blocked_until: Option<DateTime<Utc>>,
    total_blocks: u64,
}

/// Outcome of a rate limit check. Hitting the quota is an ordinary return
/// value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allowed {
        remaining: u32,
        reset_at: DateTime<Utc>,
    },
    Blocked {
        /// Seconds until the block lifts; fractional.
        retry_after: f64,
        total_blocks: u64,
    },
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("invalid rate limit config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("empty rate limit key")]
    EmptyKey,
}

/// Registry of per-key trackers. One instance per process, created at startup
/// and shared behind `Arc<AppState>`; tests build their own so state never
/// leaks between them.
#[derive(Debug, Default)]
pub struct RateLimiter {
    trackers: DashMap<String, Tracker>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            trackers: DashMap::new(),
        }
    }

    /// Check whether `key` may make a request at `now`, recording it if so.
    ///
    /// The DashMap entry guard holds the key's shard for the whole
    /// read-modify-write, so two concurrent callers on the same key cannot
    /// both observe a count under the quota and both be admitted.
    pub fn check_and_record(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now: DateTime<Utc>,
    ) -> Result<Decision, RateLimitError> {
        if key.is_empty() {
            return Err(RateLimitError::EmptyKey);
        }
        config.validate()?;

        let mut entry = self.trackers.entry(key.to_string()).or_default();
        let tracker = entry.value_mut();

        if let Some(blocked_until) = tracker.blocked_until {
            if now < blocked_until {
                // Still blocked; the attempt is not recorded
                let retry_after = (blocked_until - now).num_milliseconds() as f64 / 1000.0;
                return Ok(Decision::Blocked {
                    retry_after,
                    total_blocks: tracker.total_blocks,
                });
            }
            tracker.blocked_until = None;
        }

        // Drop timestamps that fell out of the window, then count this request
        let cutoff = now - config.window();
        tracker.requests.retain(|t| *t >= cutoff);
        tracker.requests.push(now);

        if tracker.requests.len() > config.points as usize {
            tracker.blocked_until = Some(now + config.block());
            tracker.total_blocks += 1;
            warn!(
                key,
                total_blocks = tracker.total_blocks,
                block_secs = config.block_duration_secs,
                "rate limit exceeded, key blocked"
            );
            return Ok(Decision::Blocked {
                retry_after: config.block_duration_secs as f64,
                total_blocks: tracker.total_blocks,
            });
        }

        Ok(Decision::Allowed {
            remaining: config.points - tracker.requests.len() as u32,
            reset_at: now + config.window(),
        })
    }

    /// Remove trackers with no in-window history and no live block. Locks one
    /// shard at a time, so inbound checks are not stalled behind a full scan.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.trackers.len();
        self.trackers.retain(|_, tracker| {
            !tracker.requests.is_empty()
                || tracker.blocked_until.is_some_and(|until| until > now)
        });
        before.saturating_sub(self.trackers.len())
    }

    /// Number of tracked keys.
    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }
}
