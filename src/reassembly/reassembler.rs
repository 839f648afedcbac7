//! Worker turning interleaved byte deliveries into packet notifications.
//!
//! [`StreamReassembler`] is the single consumer: it drains the pending
//! queue in FIFO order, runs the injected [`FramingPolicy`] under the
//! state lock (so extraction never races a `submit` for the same
//! connection's buffer), and notifies listeners only after the lock is
//! released. [`ReassemblyHandle`] is the cheaply cloneable caller side,
//! safe to use from any number of threads.

use std::{
    collections::{HashMap, hash_map::Entry},
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{debug, warn};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::{
    ReassemblyConfig,
    buffer::PendingBuffer,
    error::SubmitError,
    framing::FramingPolicy,
    listener::{ListenerSet, PacketListener},
    pending::PendingQueue,
};
use crate::{connection::ConnectionId, metrics, panic::payload_message};

#[derive(Default)]
struct ReassemblyState {
    buffers: HashMap<ConnectionId, PendingBuffer>,
    pending: PendingQueue,
}

struct Shared<P> {
    state: Mutex<ReassemblyState>,
    listeners: ListenerSet<P>,
    wake: Notify,
    shutdown: CancellationToken,
    config: ReassemblyConfig,
}

impl<P> Shared<P> {
    fn lock_state(&self) -> MutexGuard<'_, ReassemblyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Worker reassembling per-connection byte streams into packets.
///
/// Construct a worker/handle pair with [`StreamReassembler::new`], spawn
/// [`run`](Self::run) on the runtime, and feed bytes through the handle:
///
/// ```no_run
/// use std::num::NonZeroUsize;
///
/// use packetloom::{ConnectionId, FixedSizeFraming, ReassemblyConfig, StreamReassembler};
///
/// # async fn example() {
/// let framing = FixedSizeFraming::new(NonZeroUsize::new(4).expect("non-zero"));
/// let (reassembler, handle) = StreamReassembler::new(ReassemblyConfig::default(), framing);
/// tokio::spawn(reassembler.run());
/// handle
///     .submit(ConnectionId::new(1), b"ABCD")
///     .expect("submit accepted");
/// # }
/// ```
pub struct StreamReassembler<F: FramingPolicy> {
    shared: Arc<Shared<F::Packet>>,
    framing: F,
}

impl<F: FramingPolicy> StreamReassembler<F> {
    /// Create a worker and its caller-side handle.
    #[must_use]
    pub fn new(config: ReassemblyConfig, framing: F) -> (Self, ReassemblyHandle<F::Packet>) {
        let shared = Arc::new(Shared {
            state: Mutex::new(ReassemblyState::default()),
            listeners: ListenerSet::new(),
            wake: Notify::new(),
            shutdown: CancellationToken::new(),
            config,
        });
        let handle = ReassemblyHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared, framing }, handle)
    }

    /// Run the worker until [`ReassemblyHandle::stop`] is observed.
    ///
    /// The loop suspends only while the pending queue is empty; every
    /// wake re-checks the queue rather than trusting the wake reason, so
    /// a stale notification never causes work on data that no longer
    /// needs it. On stop the worker drains no further data, clears all
    /// buffers, the pending queue, and the listener set, then exits.
    pub async fn run(self) {
        loop {
            tokio::select! {
                biased;
                () = self.shared.shutdown.cancelled() => break,
                () = self.shared.wake.notified() => {}
            }
            self.drain_pending();
        }
        self.teardown();
    }

    fn drain_pending(&self) {
        while !self.shared.shutdown.is_cancelled() {
            let Some((connection, packets)) = self.extract_next() else {
                break;
            };
            self.dispatch(connection, &packets);
        }
    }

    /// Pop the next pending connection and run one extraction pass over
    /// its buffer, all under the state lock.
    fn extract_next(&self) -> Option<(ConnectionId, Vec<F::Packet>)> {
        let mut guard = self.shared.lock_state();
        let ReassemblyState { buffers, pending } = &mut *guard;
        let connection = pending.next()?;
        let Some(buffer) = buffers.get_mut(&connection) else {
            // Released while queued; nothing to extract.
            return Some((connection, Vec::new()));
        };
        let packets = match self.framing.extract(connection, buffer) {
            Ok(packets) => packets,
            Err(err) => {
                warn!("framing failed on {connection}, resetting buffer: {err}");
                buffer.clear();
                Vec::new()
            }
        };
        Some((connection, packets))
    }

    fn dispatch(&self, connection: ConnectionId, packets: &[F::Packet]) {
        if packets.is_empty() {
            return;
        }
        let listeners = self.shared.listeners.snapshot();
        for packet in packets {
            metrics::inc_packets_assembled();
            for listener in &listeners {
                if self.shared.shutdown.is_cancelled() {
                    return;
                }
                let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    listener.on_packet(connection, packet);
                }));
                if let Err(payload) = outcome {
                    metrics::inc_listener_panics();
                    tracing::error!(
                        connection = %connection,
                        panic = %payload_message(payload.as_ref()),
                        "packet listener panicked",
                    );
                }
            }
        }
    }

    fn teardown(&self) {
        {
            let mut guard = self.shared.lock_state();
            guard.buffers.clear();
            guard.pending.clear();
        }
        self.shared.listeners.clear();
        debug!("stream reassembler stopped");
    }
}

/// Caller-side handle to a [`StreamReassembler`].
///
/// All operations are safe to call from any thread at any time; handles
/// clone cheaply and share one worker.
pub struct ReassemblyHandle<P> {
    shared: Arc<Shared<P>>,
}

impl<P> Clone for ReassemblyHandle<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P> ReassemblyHandle<P> {
    /// Append raw bytes to a connection's pending buffer and mark the
    /// connection for extraction.
    ///
    /// The worker is woken only when the connection newly became pending;
    /// a connection already queued, or a worker already draining, sees no
    /// duplicate wake. After [`stop`](Self::stop) the call is a logged
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::BufferExhausted`] when the buffer cannot
    /// grow to hold the delivery. The connection's reassembly state is
    /// dropped; the caller should tear the connection down.
    pub fn submit(&self, connection: ConnectionId, bytes: &[u8]) -> Result<(), SubmitError> {
        if self.shared.shutdown.is_cancelled() {
            debug!(
                "dropping {} bytes submitted on {connection} after stop",
                bytes.len()
            );
            return Ok(());
        }
        let newly_pending = {
            let mut guard = self.shared.lock_state();
            let ReassemblyState { buffers, pending } = &mut *guard;
            match buffers.entry(connection) {
                Entry::Occupied(mut occupied) => {
                    if let Err(source) = occupied
                        .get_mut()
                        .write(bytes, self.shared.config.growth_increment)
                    {
                        occupied.remove();
                        pending.remove(connection);
                        return Err(SubmitError::BufferExhausted { connection, source });
                    }
                }
                Entry::Vacant(vacant) => {
                    match PendingBuffer::with_first_chunk(&self.shared.config, bytes) {
                        Ok(buffer) => {
                            vacant.insert(buffer);
                        }
                        Err(source) => {
                            return Err(SubmitError::BufferExhausted { connection, source });
                        }
                    }
                }
            }
            pending.mark(connection)
        };
        metrics::add_bytes_submitted(bytes.len() as u64);
        if newly_pending {
            self.shared.wake.notify_one();
        }
        Ok(())
    }

    /// Request worker shutdown. Idempotent and safe from any thread; the
    /// worker wakes, drains no further data, and clears buffers, queue,
    /// and listeners on exit.
    pub fn stop(&self) { self.shared.shutdown.cancel(); }

    /// Whether [`stop`](Self::stop) has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool { self.shared.shutdown.is_cancelled() }

    /// Register a listener, notified after already registered listeners.
    pub fn add_listener(&self, listener: Arc<dyn PacketListener<P>>) {
        self.shared.listeners.add(listener);
    }

    /// Remove a previously registered listener by identity.
    pub fn remove_listener(&self, listener: &Arc<dyn PacketListener<P>>) {
        self.shared.listeners.remove(listener);
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize { self.shared.listeners.len() }

    /// Drop a connection's reassembly state on teardown.
    ///
    /// Unknown identifiers are a harmless no-op, since connections may
    /// close concurrently with in-flight calls.
    pub fn release(&self, connection: ConnectionId) {
        let mut guard = self.shared.lock_state();
        let ReassemblyState { buffers, pending } = &mut *guard;
        buffers.remove(&connection);
        pending.remove(connection);
    }

    /// Whether a connection currently awaits extraction.
    #[must_use]
    pub fn is_pending(&self, connection: ConnectionId) -> bool {
        self.shared.lock_state().pending.contains(connection)
    }

    /// Number of connections awaiting extraction.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.shared.lock_state().pending.len() }

    /// Total unconsumed bytes across all connections.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize {
        self.shared
            .lock_state()
            .buffers
            .values()
            .map(PendingBuffer::len)
            .sum()
    }
}
