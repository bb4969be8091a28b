//! Sliding-window rate limiting for login attempts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Per-identifier sliding-window limiter.
///
/// Only attempts younger than `window` count. Old timestamps are dropped
/// lazily when an identifier is read, and an identifier with nothing left
/// in its window loses its entry. There is no background sweep.
pub struct SlidingWindowLimiter<C: Clock = SystemClock> {
    attempts: DashMap<String, Vec<u64>>,
    max_attempts: u32,
    window_ms: u64,
    clock: C,
}

impl SlidingWindowLimiter<SystemClock> {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self::with_clock(max_attempts, window, SystemClock)
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.window_ms))
    }
}

impl Default for SlidingWindowLimiter<SystemClock> {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

impl<C: Clock> SlidingWindowLimiter<C> {
    pub fn with_clock(max_attempts: u32, window: Duration, clock: C) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts,
            window_ms: window.as_millis() as u64,
            clock,
        }
    }

    fn recent(&self, stamps: &[u64], now: u64) -> Vec<u64> {
        stamps
            .iter()
            .copied()
            .filter(|t| now.saturating_sub(*t) < self.window_ms)
            .collect()
    }

    /// Record an attempt for `identifier` if it is still under the limit.
    ///
    /// The check and the append happen under the same shard lock, so two
    /// concurrent callers cannot both take the last slot.
    pub fn is_allowed(&self, identifier: &str) -> bool {
        let now = self.clock.now_ms();
        let mut entry = self.attempts.entry(identifier.to_string()).or_default();

        let mut recent = self.recent(&entry, now);
        if recent.len() >= self.max_attempts as usize {
            tracing::warn!(identifier = %identifier, attempts = recent.len(), "Rate limit exceeded");
            metrics::record_rate_limited();
            return false;
        }

        recent.push(now);
        *entry = recent;
        true
    }

    /// Attempts left in the current window. Never records an attempt.
    pub fn remaining_attempts(&self, identifier: &str) -> u32 {
        let now = self.clock.now_ms();
        let used = self
            .attempts
            .get(identifier)
            .map(|stamps| self.recent(&stamps, now).len());

        if used == Some(0) {
            self.attempts
                .remove_if(identifier, |_, stamps| self.recent(stamps, now).is_empty());
        }

        self.max_attempts.saturating_sub(used.unwrap_or(0) as u32)
    }

    /// Forget every attempt recorded for `identifier`.
    pub fn reset(&self, identifier: &str) {
        if self.attempts.remove(identifier).is_some() {
            tracing::debug!(identifier = %identifier, "Rate limit reset");
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Number of identifiers currently holding an entry.
    pub fn tracked(&self) -> usize {
        self.attempts.len()
    }
}
