//! Replay Guard
//!
//! Remembers recently seen `Twitch-Eventsub-Message-Id` values so a
//! redelivered message is acknowledged without being dispatched twice.
//! Entries older than the window are pruned on insert, once the map has
//! doubled in size since the last prune.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Smallest map size that triggers a prune.
const PRUNE_THRESHOLD: usize = 1024;

/// Thread-safe set of recently seen message ids.
pub struct ReplayGuard {
    seen: DashMap<String, Instant>,
    window: Duration,
    /// Map size at which the next prune runs.
    prune_at: AtomicUsize,
}

impl ReplayGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            seen: DashMap::new(),
            window,
            prune_at: AtomicUsize::new(PRUNE_THRESHOLD),
        }
    }

    /// Record a message id. Returns `false` if it was already seen within
    /// the window.
    pub fn first_seen(&self, message_id: &str) -> bool {
        self.first_seen_at(message_id, Instant::now())
    }

    fn first_seen_at(&self, message_id: &str, now: Instant) -> bool {
        if self.seen.len() > self.prune_at.load(Ordering::Relaxed) {
            self.prune(now);
        }

        let mut fresh = true;
        self.seen
            .entry(message_id.to_string())
            .and_modify(|seen_at| {
                if now.duration_since(*seen_at) < self.window {
                    fresh = false;
                } else {
                    *seen_at = now;
                }
            })
            .or_insert(now);
        fresh
    }

    fn prune(&self, now: Instant) {
        self.seen
            .retain(|_, seen_at| now.duration_since(*seen_at) < self.window);
        let next = (self.seen.len() * 2).max(PRUNE_THRESHOLD);
        self.prune_at.store(next, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
