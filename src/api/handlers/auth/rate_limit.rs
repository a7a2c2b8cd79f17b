//! Login rate limiting keyed by client address.
//!
//! Flow Overview:
//! 1) Every login attempt calls `check` before credentials are looked at.
//! 2) Attempts are counted in a fixed window anchored to the first attempt.
//! 3) A successful login calls `reset` so earlier failures are forgotten.
//! 4) A background task sweeps expired entries to bound memory.
//!
//! Scaling: the in-memory store is per process. Multi-instance deployments can
//! plug in a shared store through the `RateLimiter` trait.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use tracing::debug;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

impl RateLimitDecision {
    #[must_use]
    pub const fn is_limited(self) -> bool {
        matches!(self, Self::Limited)
    }
}

/// Address → attempt-count store consulted by the login handler.
///
/// `check` must behave as one atomic check-and-increment per address.
pub trait RateLimiter: Send + Sync {
    fn check(&self, address: &str) -> RateLimitDecision;
    fn reset(&self, address: &str);
    /// Drop entries whose window has elapsed. Returns how many were removed.
    fn sweep(&self) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RateLimitEntry {
    attempts: u32,
    first_attempt: Instant,
}

#[derive(Debug)]
pub struct MemoryRateLimiter {
    max_attempts: u32,
    window: Duration,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl Default for MemoryRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

impl MemoryRateLimiter {
    #[must_use]
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock leaves the map usable; counts are advisory.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn window_elapsed(&self, entry: &RateLimitEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.first_attempt) > self.window
    }

    pub fn check_at(&self, address: &str, now: Instant) -> RateLimitDecision {
        let mut entries = self.entries();

        let Some(entry) = entries.get_mut(address) else {
            entries.insert(
                address.to_string(),
                RateLimitEntry {
                    attempts: 1,
                    first_attempt: now,
                },
            );
            return RateLimitDecision::Allowed;
        };

        if self.window_elapsed(entry, now) {
            *entry = RateLimitEntry {
                attempts: 1,
                first_attempt: now,
            };
            return RateLimitDecision::Allowed;
        }

        if entry.attempts >= self.max_attempts {
            return RateLimitDecision::Limited;
        }

        entry.attempts += 1;
        RateLimitDecision::Allowed
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| !self.window_elapsed(entry, now));
        before - entries.len()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries().len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn attempts(&self, address: &str) -> Option<u32> {
        self.entries().get(address).map(|entry| entry.attempts)
    }
}

impl RateLimiter for MemoryRateLimiter {
    fn check(&self, address: &str) -> RateLimitDecision {
        self.check_at(address, Instant::now())
    }

    fn reset(&self, address: &str) {
        self.entries().remove(address);
    }

    fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }
}

/// Spawn the periodic sweep. The first tick fires after one full interval.
pub fn spawn_sweeper(
    limiter: Arc<dyn RateLimiter>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        loop {
            ticker.tick().await;
            let removed = limiter.sweep();
            debug!("rate limit sweep removed {removed} expired entries");
        }
    })
}
