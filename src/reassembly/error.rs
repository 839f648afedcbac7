//! Error types emitted by the reassembly layer.
//!
//! Expected races — stale connection identifiers, submissions landing
//! after a stop — are deliberately not errors; they degrade to no-ops.
//! Only allocation failure and framing violations surface here.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::connection::ConnectionId;

/// Errors surfaced by
/// [`ReassemblyHandle::submit`](crate::reassembly::ReassemblyHandle::submit).
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Growing the connection's pending buffer failed. The buffer entry
    /// has been dropped; the caller owns the connection and should tear
    /// it down.
    #[error("pending buffer allocation failed for {connection}: {source}")]
    BufferExhausted {
        /// Connection whose reassembly state was lost.
        connection: ConnectionId,
        /// Underlying allocator refusal.
        source: TryReserveError,
    },
}

/// Error returned by a [`FramingPolicy`](crate::reassembly::FramingPolicy)
/// that cannot make sense of a connection's accumulated bytes.
///
/// The reassembler logs the error and resets the offending connection's
/// buffer; content validity beyond that is the policy's concern.
#[derive(Debug, Error)]
#[error("framing violated: {reason}")]
pub struct FramingError {
    reason: String,
}

impl FramingError {
    /// Construct a framing error with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
