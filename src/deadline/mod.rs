//! Deadline scheduling: per-connection timeouts without busy-waiting.
//!
//! The scheduler half of the backbone. Callers arm deadlines ("close the
//! connection if no data in N seconds") through a [`SchedulerHandle`];
//! one worker sleeps exactly until the nearest expiry and fires
//! [`TimeoutListener`]s synchronously, in non-decreasing expiry order.
//! Cancelled deadlines never fire.

mod registry;
pub mod scheduler;
pub mod timeout;

pub use scheduler::{DeadlineScheduler, SchedulerHandle};
pub use timeout::{TimeoutHandle, TimeoutListener};

#[cfg(test)]
mod tests;
