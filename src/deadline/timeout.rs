//! Deadline value type, listener contract, and the caller-facing handle.

use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

use tokio::time::Instant;

use super::{registry::DeadlineKey, scheduler::SchedulerShared};
use crate::{connection::ConnectionId, metrics};

/// Observer notified when a deadline expires uncancelled.
///
/// Listeners run synchronously on the scheduler worker; a listener that
/// blocks delays every later deadline, so implementations must return
/// promptly. A panicking listener is caught and logged.
pub trait TimeoutListener: Send + Sync {
    /// Called with the connection the expired deadline was armed for.
    fn on_timeout(&self, connection: ConnectionId);
}

impl<F> TimeoutListener for F
where
    F: Fn(ConnectionId) + Send + Sync,
{
    fn on_timeout(&self, connection: ConnectionId) { self(connection); }
}

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Terminal-state cell shared between a registry entry and its handle.
///
/// The cell transitions exactly once, armed to fired or armed to
/// cancelled, written only by whichever side removed the entry from the
/// registry — registry removal under the lock is the serialisation point
/// between a racing fire and cancel.
#[derive(Debug)]
pub(crate) struct DeadlineCell(AtomicU8);

impl Default for DeadlineCell {
    fn default() -> Self { Self(AtomicU8::new(ARMED)) }
}

impl DeadlineCell {
    pub(crate) fn mark_fired(&self) { self.0.store(FIRED, Ordering::Release); }

    pub(crate) fn mark_cancelled(&self) { self.0.store(CANCELLED, Ordering::Release); }

    fn load(&self) -> u8 { self.0.load(Ordering::Acquire) }
}

/// Registry entry for one armed deadline.
pub(crate) struct Deadline {
    connection: ConnectionId,
    listener: Arc<dyn TimeoutListener>,
    cell: Arc<DeadlineCell>,
}

impl Deadline {
    pub(crate) fn new(
        connection: ConnectionId,
        listener: Arc<dyn TimeoutListener>,
        cell: Arc<DeadlineCell>,
    ) -> Self {
        Self {
            connection,
            listener,
            cell,
        }
    }

    /// Mark the deadline expired and release its parts for firing.
    pub(crate) fn begin_fire(self) -> (ConnectionId, Arc<dyn TimeoutListener>) {
        self.cell.mark_fired();
        (self.connection, self.listener)
    }
}

/// Handle to one armed deadline.
///
/// The handle keeps only a weak reference to the scheduler, so a handle
/// outliving its scheduler degrades to a no-op rather than prolonging the
/// scheduler's life.
#[derive(Clone)]
pub struct TimeoutHandle {
    connection: ConnectionId,
    duration: Duration,
    created_at: Instant,
    expires_at: Instant,
    key: DeadlineKey,
    cell: Arc<DeadlineCell>,
    shared: Weak<SchedulerShared>,
}

impl TimeoutHandle {
    pub(crate) fn new(
        connection: ConnectionId,
        duration: Duration,
        created_at: Instant,
        key: DeadlineKey,
        cell: Arc<DeadlineCell>,
        shared: Weak<SchedulerShared>,
    ) -> Self {
        Self {
            connection,
            duration,
            created_at,
            expires_at: key.expires_at(),
            key,
            cell,
            shared,
        }
    }

    /// Cancel the deadline if it has not yet fired.
    ///
    /// Idempotent: a second call, or a call racing the worker's fire, is
    /// an observable no-op. Whichever side removes the registry entry
    /// first decides the terminal state. The worker is woken so it never
    /// keeps waiting on a deadline that no longer exists.
    pub fn cancel(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let removed = shared.lock_registry().remove(self.key).is_some();
        if removed {
            self.cell.mark_cancelled();
            metrics::inc_deadlines_cancelled();
            shared.wake.notify_one();
        }
    }

    /// Whether the deadline has fired.
    #[must_use]
    pub fn is_expired(&self) -> bool { self.cell.load() == FIRED }

    /// Whether the deadline was cancelled before firing.
    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.cell.load() == CANCELLED }

    /// Connection the deadline was armed for.
    #[must_use]
    pub fn connection(&self) -> ConnectionId { self.connection }

    /// Requested duration.
    #[must_use]
    pub fn duration(&self) -> Duration { self.duration }

    /// Instant the deadline was armed.
    #[must_use]
    pub fn created_at(&self) -> Instant { self.created_at }

    /// Absolute expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> Instant { self.expires_at }
}
