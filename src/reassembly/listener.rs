//! Packet listener contract and registration set.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::connection::ConnectionId;

/// Observer notified exactly once per completed packet, in registration
/// order.
///
/// Listeners run on the reassembly worker with no internal lock held;
/// they must not block indefinitely, since that stalls extraction for
/// every connection. A listener that panics is caught and logged without
/// disturbing later listeners.
pub trait PacketListener<P>: Send + Sync {
    /// Called with the connection the packet arrived on and the packet.
    fn on_packet(&self, connection: ConnectionId, packet: &P);
}

impl<P, F> PacketListener<P> for F
where
    F: Fn(ConnectionId, &P) + Send + Sync,
{
    fn on_packet(&self, connection: ConnectionId, packet: &P) { self(connection, packet); }
}

/// Registration-ordered listener collection.
///
/// Dispatch works from a point-in-time snapshot, so listeners can be
/// added or removed concurrently with an in-flight notification pass.
pub(crate) struct ListenerSet<P> {
    entries: Mutex<Vec<Arc<dyn PacketListener<P>>>>,
}

impl<P> ListenerSet<P> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn PacketListener<P>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add(&self, listener: Arc<dyn PacketListener<P>>) { self.lock().push(listener); }

    /// Remove a previously added listener by identity.
    pub(crate) fn remove(&self, listener: &Arc<dyn PacketListener<P>>) {
        self.lock().retain(|entry| !Arc::ptr_eq(entry, listener));
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn PacketListener<P>>> { self.lock().clone() }

    pub(crate) fn clear(&self) { self.lock().clear(); }

    pub(crate) fn len(&self) -> usize { self.lock().len() }
}
