//! Ordered collection of live deadlines.

use std::collections::BTreeMap;

use tokio::time::Instant;

use super::timeout::Deadline;

/// Ordering key for armed deadlines: absolute expiry first, then an
/// insertion sequence number.
///
/// The sequence makes the equal-expiry tie-break explicit — deadlines
/// armed with identical expiries fire in arm order — and the key compares
/// whole [`Instant`] values, never a narrowed arithmetic difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct DeadlineKey {
    expires_at: Instant,
    seq: u64,
}

impl DeadlineKey {
    pub(crate) fn new(expires_at: Instant, seq: u64) -> Self { Self { expires_at, seq } }

    pub(crate) fn expires_at(&self) -> Instant { self.expires_at }
}

/// Live (armed, neither fired nor cancelled) deadlines in firing order.
#[derive(Default)]
pub(crate) struct DeadlineRegistry {
    entries: BTreeMap<DeadlineKey, Deadline>,
    next_seq: u64,
}

impl DeadlineRegistry {
    /// Insert a deadline, returning the key its handle needs to cancel it.
    pub(crate) fn insert(&mut self, expires_at: Instant, deadline: Deadline) -> DeadlineKey {
        let key = DeadlineKey::new(expires_at, self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, deadline);
        key
    }

    /// Remove an arbitrary entry; `None` when it already fired or was
    /// already cancelled.
    pub(crate) fn remove(&mut self, key: DeadlineKey) -> Option<Deadline> {
        self.entries.remove(&key)
    }

    /// Expiry of the nearest deadline, if any.
    pub(crate) fn next_expiry(&self) -> Option<Instant> {
        self.entries.keys().next().map(DeadlineKey::expires_at)
    }

    /// Pop the minimum entry if its expiry has passed.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<Deadline> {
        let key = *self.entries.first_key_value()?.0;
        if key.expires_at() > now {
            return None;
        }
        self.entries.remove(&key)
    }

    pub(crate) fn len(&self) -> usize { self.entries.len() }

    pub(crate) fn clear(&mut self) { self.entries.clear(); }
}
