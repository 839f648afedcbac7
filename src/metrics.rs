//! Metric helpers for `packetloom`.
//!
//! This module defines metric names and small helper functions wrapping
//! the [`metrics`](https://docs.rs/metrics) crate. With the `metrics`
//! feature disabled the helpers compile to no-ops so call sites stay
//! unconditional.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking completed packets handed to listeners.
pub const PACKETS_ASSEMBLED: &str = "packetloom_packets_assembled_total";
/// Name of the counter tracking raw bytes accepted into pending buffers.
pub const BYTES_SUBMITTED: &str = "packetloom_bytes_submitted_total";
/// Name of the counter tracking caught listener panics.
pub const LISTENER_PANICS: &str = "packetloom_listener_panics_total";
/// Name of the counter tracking deadlines that fired.
pub const DEADLINES_FIRED: &str = "packetloom_deadlines_fired_total";
/// Name of the counter tracking deadlines cancelled before firing.
pub const DEADLINES_CANCELLED: &str = "packetloom_deadlines_cancelled_total";

/// Record a completed packet delivered to the listener set.
pub fn inc_packets_assembled() {
    #[cfg(feature = "metrics")]
    counter!(PACKETS_ASSEMBLED).increment(1);
}

/// Record raw bytes accepted by `submit`.
pub fn add_bytes_submitted(count: u64) {
    #[cfg(feature = "metrics")]
    counter!(BYTES_SUBMITTED).increment(count);
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}

/// Record a listener panic caught by a worker.
pub fn inc_listener_panics() {
    #[cfg(feature = "metrics")]
    counter!(LISTENER_PANICS).increment(1);
}

/// Record a deadline fired by the scheduler.
pub fn inc_deadlines_fired() {
    #[cfg(feature = "metrics")]
    counter!(DEADLINES_FIRED).increment(1);
}

/// Record a deadline cancelled before it fired.
pub fn inc_deadlines_cancelled() {
    #[cfg(feature = "metrics")]
    counter!(DEADLINES_CANCELLED).increment(1);
}
