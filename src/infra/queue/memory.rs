//! In-memory tick queue ordered by due time.

use std::collections::BinaryHeap;

use super::DueTick;
use crate::core::{CampaignError, ScheduledTick, TickQueue};

/// In-memory queue storing pending ticks in a min-heap by due time.
/// O(log n) push and pop; pending ticks are lost on restart.
pub struct InMemoryTickQueue {
    max_depth: usize,
    ticks: BinaryHeap<DueTick>,
}

impl InMemoryTickQueue {
    /// Create a queue holding at most `max_depth` ticks.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ticks: BinaryHeap::with_capacity(max_depth.min(1024)),
        }
    }
}

impl TickQueue for InMemoryTickQueue {
    fn push(&mut self, tick: ScheduledTick) -> Result<(), CampaignError> {
        if self.len() >= self.max_depth() {
            return Err(CampaignError::QueueFull("max queue depth reached".into()));
        }
        self.ticks.push(DueTick(tick));
        Ok(())
    }

    fn pop_due(&mut self, now_ms: u64) -> Result<Option<ScheduledTick>, CampaignError> {
        match self.ticks.peek() {
            Some(head) if head.0.due_ms <= now_ms => Ok(self.ticks.pop().map(|t| t.0)),
            _ => Ok(None),
        }
    }

    fn next_due(&self) -> Option<u64> {
        self.ticks.peek().map(|t| t.0.due_ms)
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn len(&self) -> usize {
        self.ticks.len()
    }
}
