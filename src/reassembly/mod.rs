//! Stream reassembly: fragmented byte deliveries in, packets out.
//!
//! This module collects the stream-reassembly half of the backbone. Raw
//! bytes arrive per connection in arbitrary chunks; a single worker runs
//! the injected [`FramingPolicy`] over each connection's accumulated
//! bytes and notifies [`PacketListener`]s of every completed packet. Each
//! sub-module focuses on a single concept to keep the code small and easy
//! to audit while still providing a cohesive API at the crate root.

pub mod buffer;
pub mod config;
pub mod error;
pub mod framing;
pub mod listener;
mod pending;
pub mod reassembler;

pub use buffer::PendingBuffer;
pub use config::{DEFAULT_GROWTH_INCREMENT, DEFAULT_INITIAL_CAPACITY, ReassemblyConfig};
pub use error::{FramingError, SubmitError};
pub use framing::{
    DEFAULT_MAX_FRAME_LEN,
    FixedSizeFraming,
    FramingPolicy,
    LENGTH_PREFIX_BYTES,
    LengthPrefixedFraming,
    length_prefixed_frame,
};
pub use listener::PacketListener;
pub use reassembler::{ReassemblyHandle, StreamReassembler};
