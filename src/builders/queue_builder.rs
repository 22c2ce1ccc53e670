//! Tick queue selection from [`WorkerConfig`].

use crate::config::{QueueBackendConfig, WorkerConfig};
use crate::core::{CampaignError, ScheduledTick, TickQueue};
use crate::infra::{FileTickQueue, InMemoryTickQueue};

/// Name of the file holding pending ticks under the configured directory.
pub const TICK_STREAM: &str = "campaign_ticks";

/// Tick queue chosen at startup.
pub enum LocalTickQueue {
    /// Heap in memory.
    Memory(InMemoryTickQueue),
    /// JSON-lines file.
    File(FileTickQueue),
}

impl LocalTickQueue {
    /// Highest sequence number already queued.
    #[must_use]
    pub fn last_seq(&self) -> u64 {
        match self {
            Self::Memory(_) => 0,
            Self::File(q) => q.max_seq(),
        }
    }
}

impl TickQueue for LocalTickQueue {
    fn push(&mut self, tick: ScheduledTick) -> Result<(), CampaignError> {
        match self {
            Self::Memory(q) => q.push(tick),
            Self::File(q) => q.push(tick),
        }
    }

    fn pop_due(&mut self, now_ms: u64) -> Result<Option<ScheduledTick>, CampaignError> {
        match self {
            Self::Memory(q) => q.pop_due(now_ms),
            Self::File(q) => q.pop_due(now_ms),
        }
    }

    fn next_due(&self) -> Option<u64> {
        match self {
            Self::Memory(q) => q.next_due(),
            Self::File(q) => q.next_due(),
        }
    }

    fn max_depth(&self) -> usize {
        match self {
            Self::Memory(q) => q.max_depth(),
            Self::File(q) => q.max_depth(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Memory(q) => q.len(),
            Self::File(q) => q.len(),
        }
    }
}

/// Build the tick queue the worker config asks for.
pub fn build_tick_queue(cfg: &WorkerConfig) -> Result<LocalTickQueue, CampaignError> {
    cfg.validate()
        .map_err(|e| CampaignError::InvalidArgument(format!("worker config invalid: {e}")))?;
    let queue = match &cfg.queue {
        QueueBackendConfig::InMemory => {
            LocalTickQueue::Memory(InMemoryTickQueue::new(cfg.max_queue_depth))
        }
        QueueBackendConfig::File { path } => {
            LocalTickQueue::File(FileTickQueue::new(path, TICK_STREAM, cfg.max_queue_depth)?)
        }
    };
    tracing::info!(pending = queue.len(), "tick queue ready");
    Ok(queue)
}
