//! Delayed tick queue backends.

pub mod file;
pub mod memory;

use std::cmp::Ordering;

use crate::core::ScheduledTick;

pub use file::FileTickQueue;
pub use memory::InMemoryTickQueue;

/// Heap entry ordering ticks earliest-due first and FIFO within a due time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DueTick(pub(crate) ScheduledTick);

impl PartialOrd for DueTick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DueTick {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for the max-heap.
        other
            .0
            .due_ms
            .cmp(&self.0.due_ms)
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}
