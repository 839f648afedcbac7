//! Per-connection byte accumulator with bounded, amortised growth.
//!
//! A [`PendingBuffer`] holds bytes received for one connection but not
//! yet consumed into a complete packet. Writes grow capacity by the
//! shortfall plus a configured increment rather than doubling, which
//! bounds over-allocation when one delivery dwarfs its predecessors while
//! still amortising runs of small deliveries. Capacity never shrinks
//! implicitly; the entry is dropped wholesale on connection teardown.

use std::{collections::TryReserveError, num::NonZeroUsize};

use super::ReassemblyConfig;

/// Growable accumulator for one connection's unconsumed bytes.
#[derive(Debug)]
pub struct PendingBuffer {
    data: Vec<u8>,
}

impl PendingBuffer {
    /// Allocate a buffer for a connection's first delivery, sized to the
    /// larger of the configured initial capacity and the delivery itself.
    ///
    /// Exposed so framing-policy implementations can be tested against a
    /// hand-built buffer.
    ///
    /// # Errors
    ///
    /// Returns the allocator's [`TryReserveError`] if the reservation
    /// fails; no buffer exists afterwards.
    pub fn with_first_chunk(
        config: &ReassemblyConfig,
        chunk: &[u8],
    ) -> Result<Self, TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(config.initial_capacity.get().max(chunk.len()))?;
        data.extend_from_slice(chunk);
        Ok(Self { data })
    }

    /// Append a delivery, growing by shortfall plus `growth_increment`
    /// when the remaining capacity is insufficient.
    ///
    /// # Errors
    ///
    /// Returns the allocator's [`TryReserveError`] if growth fails; the
    /// buffer contents are unchanged in that case.
    pub fn write(
        &mut self,
        chunk: &[u8],
        growth_increment: NonZeroUsize,
    ) -> Result<(), TryReserveError> {
        let remaining = self.data.capacity() - self.data.len();
        if remaining < chunk.len() {
            self.data
                .try_reserve_exact(chunk.len().saturating_add(growth_increment.get()))?;
        }
        self.data.extend_from_slice(chunk);
        Ok(())
    }

    /// View the unconsumed bytes in submission order.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { self.data.as_slice() }

    /// Number of unconsumed bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether every submitted byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Current capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize { self.data.capacity() }

    /// Remove `count` bytes from the front, keeping any trailing partial
    /// frame in place.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds [`len`](Self::len); framing policies must
    /// only consume bytes they have observed.
    pub fn consume(&mut self, count: usize) {
        assert!(
            count <= self.data.len(),
            "consume past the end of the pending buffer"
        );
        self.data.drain(..count);
    }

    /// Discard all unconsumed bytes, retaining capacity.
    pub fn clear(&mut self) { self.data.clear(); }
}
