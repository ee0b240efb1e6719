//! Single-slot, time-expiring store of the last-notified fingerprint.

use std::time::{Duration, Instant};

use crate::fingerprint::Fingerprint;

/// Default time-to-live for the cached fingerprint.
///
/// Expiry is a safety net over long uptimes; the overwrite on every
/// notification is the primary dedup mechanism.
pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

/// Holds the fingerprint of the most recently notified event.
///
/// Exactly one slot: the cache dedups only against the immediately
/// preceding distinct event, so alternating conditions (A, B, A, B)
/// re-notify every time. Construct one instance and hand it to the watch
/// loop; there is no process-global state.
///
/// An entry is absent if it was never stored or if its age exceeds the
/// time-to-live. Expired entries are ignored by reads and replaced by the
/// next store.
#[derive(Debug)]
pub struct DedupCache {
    slot: Option<(Fingerprint, Instant)>,
    ttl: Duration,
}

impl DedupCache {
    /// Create an empty cache with the given time-to-live.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self { slot: None, ttl }
    }

    /// The configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The live fingerprint, if one was stored within the time-to-live.
    #[must_use]
    pub fn get(&self) -> Option<&Fingerprint> {
        self.get_at(Instant::now())
    }

    /// Store a fingerprint, replacing any previous entry.
    pub fn set(&mut self, fingerprint: Fingerprint) {
        self.set_at(fingerprint, Instant::now());
    }

    /// `get` against an explicit clock reading.
    #[must_use]
    pub fn get_at(&self, now: Instant) -> Option<&Fingerprint> {
        match &self.slot {
            Some((fingerprint, stored_at)) if now.duration_since(*stored_at) <= self.ttl => {
                Some(fingerprint)
            }
            _ => None,
        }
    }

    /// `set` against an explicit clock reading.
    pub fn set_at(&mut self, fingerprint: Fingerprint, now: Instant) {
        self.slot = Some((fingerprint, now));
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
