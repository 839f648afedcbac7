//! Worker holding the live deadline set and firing expirations.
//!
//! [`DeadlineScheduler`] sleeps exactly until the nearest deadline and
//! never busy-waits: an empty registry suspends it indefinitely, and any
//! arm, cancel, or stop interrupts the wait. Every wake re-derives the
//! minimum under the registry lock instead of trusting the wake reason —
//! a concurrent arm may have installed an earlier deadline, and a cancel
//! may have removed the one being waited on.

use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use log::debug;
use tokio::{
    sync::Notify,
    time::{Instant, sleep_until},
};
use tokio_util::sync::CancellationToken;

use super::{
    registry::DeadlineRegistry,
    timeout::{Deadline, DeadlineCell, TimeoutHandle, TimeoutListener},
};
use crate::{connection::ConnectionId, metrics, panic::payload_message};

pub(crate) struct SchedulerShared {
    registry: Mutex<DeadlineRegistry>,
    pub(crate) wake: Notify,
    shutdown: CancellationToken,
}

impl SchedulerShared {
    pub(crate) fn lock_registry(&self) -> MutexGuard<'_, DeadlineRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Worker firing per-connection deadlines in expiry order.
///
/// Construct a worker/handle pair with [`DeadlineScheduler::new`], spawn
/// [`run`](Self::run) on the runtime, and arm deadlines through the
/// handle:
///
/// ```no_run
/// use std::{sync::Arc, time::Duration};
///
/// use packetloom::{ConnectionId, DeadlineScheduler, TimeoutListener};
///
/// # async fn example() {
/// let (scheduler, handle) = DeadlineScheduler::new();
/// tokio::spawn(scheduler.run());
/// let listener: Arc<dyn TimeoutListener> =
///     Arc::new(|connection: ConnectionId| log::warn!("{connection} idle, closing"));
/// let armed = handle.arm(ConnectionId::new(1), listener, Duration::from_secs(30));
/// armed.cancel();
/// # }
/// ```
pub struct DeadlineScheduler {
    shared: Arc<SchedulerShared>,
}

impl DeadlineScheduler {
    /// Create a worker and its caller-side handle.
    #[must_use]
    pub fn new() -> (Self, SchedulerHandle) {
        let shared = Arc::new(SchedulerShared {
            registry: Mutex::new(DeadlineRegistry::default()),
            wake: Notify::new(),
            shutdown: CancellationToken::new(),
        });
        let handle = SchedulerHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared }, handle)
    }

    /// Run the worker until [`SchedulerHandle::stop`] is observed.
    ///
    /// Deadlines fire synchronously on this task, one at a time, in
    /// non-decreasing expiry order. On stop the registry is cleared
    /// without firing the remaining deadlines.
    pub async fn run(self) {
        loop {
            if self.shared.shutdown.is_cancelled() {
                break;
            }
            self.fire_due();
            let next = self.shared.lock_registry().next_expiry();
            tokio::select! {
                biased;
                () = self.shared.shutdown.cancelled() => break,
                () = self.shared.wake.notified() => {}
                () = wait_until(next) => {}
            }
        }
        self.shared.lock_registry().clear();
        debug!("deadline scheduler stopped");
    }

    /// Pop and fire every deadline whose expiry has passed.
    ///
    /// Each pop holds the registry lock only briefly; the listener runs
    /// with no lock held.
    fn fire_due(&self) {
        loop {
            if self.shared.shutdown.is_cancelled() {
                return;
            }
            let Some(deadline) = self.shared.lock_registry().pop_due(Instant::now()) else {
                return;
            };
            let (connection, listener) = deadline.begin_fire();
            metrics::inc_deadlines_fired();
            let outcome =
                std::panic::catch_unwind(AssertUnwindSafe(|| listener.on_timeout(connection)));
            if let Err(payload) = outcome {
                metrics::inc_listener_panics();
                tracing::error!(
                    connection = %connection,
                    panic = %payload_message(payload.as_ref()),
                    "timeout listener panicked",
                );
            }
        }
    }
}

async fn wait_until(next: Option<Instant>) {
    match next {
        Some(expiry) => sleep_until(expiry).await,
        None => std::future::pending::<()>().await,
    }
}

/// Caller-side handle to a [`DeadlineScheduler`].
///
/// All operations are safe to call from any thread at any time; handles
/// clone cheaply and share one worker.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Arc<SchedulerShared>,
}

impl SchedulerHandle {
    /// Arm a deadline expiring `duration` from now.
    ///
    /// Multiple deadlines may coexist for one connection; they are
    /// independent. The worker is woken so it can recompute the minimum.
    /// A deadline armed after [`stop`](Self::stop) is returned already
    /// cancelled and never fires.
    #[must_use]
    pub fn arm(
        &self,
        connection: ConnectionId,
        listener: Arc<dyn TimeoutListener>,
        duration: Duration,
    ) -> TimeoutHandle {
        let created_at = Instant::now();
        let expires_at = created_at + duration;
        let cell = Arc::new(DeadlineCell::default());
        if self.shared.shutdown.is_cancelled() {
            cell.mark_cancelled();
            return TimeoutHandle::new(
                connection,
                duration,
                created_at,
                super::registry::DeadlineKey::new(expires_at, 0),
                cell,
                std::sync::Weak::new(),
            );
        }
        let key = self.shared.lock_registry().insert(
            expires_at,
            Deadline::new(connection, listener, Arc::clone(&cell)),
        );
        self.shared.wake.notify_one();
        TimeoutHandle::new(
            connection,
            duration,
            created_at,
            key,
            cell,
            Arc::downgrade(&self.shared),
        )
    }

    /// Request worker shutdown. Idempotent and safe from any thread; the
    /// worker wakes and clears the registry without firing the remaining
    /// deadlines.
    pub fn stop(&self) { self.shared.shutdown.cancel(); }

    /// Whether [`stop`](Self::stop) has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool { self.shared.shutdown.is_cancelled() }

    /// Number of deadlines currently armed.
    #[must_use]
    pub fn armed_len(&self) -> usize { self.shared.lock_registry().len() }
}
