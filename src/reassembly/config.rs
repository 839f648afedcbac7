//! Configuration for pending-buffer allocation and growth.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Capacity given to a fresh pending buffer when the first delivery is
/// smaller than this.
pub const DEFAULT_INITIAL_CAPACITY: NonZeroUsize = NonZeroUsize::new(4 * 1024).unwrap();

/// Headroom added on top of the shortfall whenever a buffer must grow.
pub const DEFAULT_GROWTH_INCREMENT: NonZeroUsize = NonZeroUsize::new(1024).unwrap();

/// Settings governing per-connection pending-buffer allocation.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ReassemblyConfig {
    /// Capacity given to a connection's buffer on first use. A first
    /// delivery larger than this sizes the buffer to the delivery instead.
    pub initial_capacity: NonZeroUsize,
    /// Extra headroom reserved beyond the shortfall whenever a delivery no
    /// longer fits, so a run of small deliveries does not reallocate on
    /// every call.
    pub growth_increment: NonZeroUsize,
}

impl ReassemblyConfig {
    /// Build a configuration from explicit sizes.
    #[must_use]
    pub const fn new(initial_capacity: NonZeroUsize, growth_increment: NonZeroUsize) -> Self {
        Self {
            initial_capacity,
            growth_increment,
        }
    }
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPACITY, DEFAULT_GROWTH_INCREMENT)
    }
}
