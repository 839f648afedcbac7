#![doc(html_root_url = "https://docs.rs/packetloom/latest")]
//! Public API for the `packetloom` library.
//!
//! This crate is the connection-processing backbone of a distributed node
//! framework: a [`StreamReassembler`] turning raw, arbitrarily fragmented
//! byte streams from many concurrent connections into discrete
//! application packets, and a [`DeadlineScheduler`] enforcing
//! per-connection deadlines without blocking the I/O path. The
//! surrounding framework hands bytes and [`ConnectionId`]s to the
//! reassembler, arms and cancels deadlines on the scheduler, and receives
//! completed packets and expiry callbacks through listener traits. The
//! two workers are independent; neither calls the other.

pub mod connection;
pub mod deadline;
pub mod metrics;
pub mod packet;
pub mod panic;
pub mod reassembly;

pub use connection::ConnectionId;
pub use deadline::{DeadlineScheduler, SchedulerHandle, TimeoutHandle, TimeoutListener};
pub use packet::Packet;
pub use reassembly::{
    FixedSizeFraming,
    FramingError,
    FramingPolicy,
    LengthPrefixedFraming,
    PacketListener,
    PendingBuffer,
    ReassemblyConfig,
    ReassemblyHandle,
    StreamReassembler,
    SubmitError,
    length_prefixed_frame,
};
