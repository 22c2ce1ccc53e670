//! Self-dispatch: "run the campaign tick again after N milliseconds".
//!
//! The engine never sleeps or loops. Each tick ends by asking an
//! [`ExecuteScheduler`] for a future tick, and the delay is realised by
//! whatever backs the scheduler (a message broker with delayed delivery, or
//! a [`TickQueue`] drained by the tick worker).

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::CampaignError;
use crate::util::clock::{due_at, now_ms};

/// Enqueues future engine ticks.
#[async_trait]
pub trait ExecuteScheduler: Send + Sync {
    /// Request an `execute(campaign_id)` after `delay_ms`.
    async fn schedule_execute(&self, campaign_id: Uuid, delay_ms: u64)
        -> Result<(), CampaignError>;
}

/// A pending tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledTick {
    /// Campaign to execute.
    pub campaign_id: Uuid,
    /// Absolute due time in milliseconds since epoch.
    pub due_ms: u64,
    /// Insertion sequence, keeps FIFO order among ticks with equal due time.
    pub seq: u64,
}

/// Abstraction for delayed tick storage.
pub trait TickQueue {
    /// Add a tick if space permits.
    fn push(&mut self, tick: ScheduledTick) -> Result<(), CampaignError>;
    /// Remove and return the earliest tick due at or before `now_ms`.
    fn pop_due(&mut self, now_ms: u64) -> Result<Option<ScheduledTick>, CampaignError>;
    /// Due time of the earliest pending tick.
    fn next_due(&self) -> Option<u64>;
    /// Maximum ticks held.
    fn max_depth(&self) -> usize;
    /// Current depth.
    fn len(&self) -> usize;
    /// True if no tick is pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`ExecuteScheduler`] backed by a local [`TickQueue`].
pub struct QueueScheduler<Q> {
    queue: Arc<Mutex<Q>>,
    seq: Mutex<u64>,
}

impl<Q> QueueScheduler<Q> {
    /// Wrap a shared queue. The same `Arc` is handed to the tick worker.
    pub const fn new(queue: Arc<Mutex<Q>>) -> Self {
        Self {
            queue,
            seq: Mutex::new(0),
        }
    }

    /// Wrap a queue that already holds ticks numbered up to `last_seq`.
    pub const fn resume(queue: Arc<Mutex<Q>>, last_seq: u64) -> Self {
        Self {
            queue,
            seq: Mutex::new(last_seq),
        }
    }

    /// Shared queue handle.
    pub fn queue(&self) -> Arc<Mutex<Q>> {
        Arc::clone(&self.queue)
    }
}

impl<Q: TickQueue> QueueScheduler<Q> {
    /// Enqueue a tick relative to an explicit `now`.
    pub fn schedule_at(
        &self,
        campaign_id: Uuid,
        delay_ms: u64,
        now: u64,
    ) -> Result<(), CampaignError> {
        let seq = {
            let mut seq = self.seq.lock();
            *seq += 1;
            *seq
        };
        let tick = ScheduledTick {
            campaign_id,
            due_ms: due_at(now, delay_ms),
            seq,
        };
        self.queue.lock().push(tick)?;
        tracing::debug!(%campaign_id, delay_ms, "tick scheduled");
        Ok(())
    }
}

#[async_trait]
impl<Q> ExecuteScheduler for QueueScheduler<Q>
where
    Q: TickQueue + Send + 'static,
{
    async fn schedule_execute(
        &self,
        campaign_id: Uuid,
        delay_ms: u64,
    ) -> Result<(), CampaignError> {
        self.schedule_at(campaign_id, delay_ms, now_ms())
    }
}

/// Abstraction for spawning tick execution on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static;
}
