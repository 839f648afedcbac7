//! Identifier for externally owned transport connections.
//!
//! The embedding I/O layer owns connection lifetime; this crate never
//! creates or destroys connections and only uses [`ConnectionId`] as a map
//! key. A stale identifier — one whose connection the owner has already
//! released — is harmless: lookups miss and the call degrades to a no-op.

/// Identifier assigned to a connection by the embedding I/O layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl From<u64> for ConnectionId {
    fn from(value: u64) -> Self { Self(value) }
}

impl ConnectionId {
    /// Create a new [`ConnectionId`] with the provided value.
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub const fn as_u64(&self) -> u64 { self.0 }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}
