//! Tick worker: polls a [`TickQueue`] and runs every due tick through
//! [`CampaignEngine::execute`].
//!
//! Concurrency is bounded by a semaphore sized from
//! [`WorkerConfig::max_concurrent_ticks`]; a due tick stays queued until a
//! permit frees up.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{watch, Semaphore};

use crate::config::WorkerConfig;
use crate::core::{AppResult, CampaignEngine, ScheduledTick, Spawn, TickOutcome, TickQueue};
use crate::util::clock::now_ms;

/// Drains due ticks into the engine.
pub struct TickWorker<Q, S> {
    engine: Arc<CampaignEngine>,
    queue: Arc<Mutex<Q>>,
    spawner: S,
    permits: Arc<Semaphore>,
    poll_interval: Duration,
}

impl<Q, S> TickWorker<Q, S>
where
    Q: TickQueue + Send + 'static,
    S: Spawn,
{
    /// Create a worker over the queue shared with the engine's scheduler.
    pub fn new(
        engine: Arc<CampaignEngine>,
        queue: Arc<Mutex<Q>>,
        spawner: S,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            engine,
            queue,
            spawner,
            permits: Arc::new(Semaphore::new(config.max_concurrent_ticks)),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    fn pop_due(&self, now: u64) -> Option<ScheduledTick> {
        match self.queue.lock().pop_due(now) {
            Ok(tick) => tick,
            Err(e) => {
                tracing::error!("tick worker failed to pop: {}", e);
                None
            }
        }
    }

    /// Spawn every tick due at `now` while permits last. Returns how many
    /// ticks were spawned.
    pub fn run_once(&self, now: u64) -> usize {
        let mut spawned = 0;
        loop {
            let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
                tracing::debug!("tick worker at capacity");
                break;
            };
            let Some(tick) = self.pop_due(now) else {
                break;
            };

            let engine = Arc::clone(&self.engine);
            self.spawner.spawn(async move {
                let _permit = permit;
                let outcome = engine.execute(tick.campaign_id).await;
                tracing::trace!(campaign_id = %tick.campaign_id, ?outcome, "tick executed");
            });
            spawned += 1;
        }
        spawned
    }

    /// Run every tick due at `now` inline, in due order, and return their
    /// outcomes. Ticks scheduled by those runs are only picked up if they
    /// are themselves due at `now`.
    pub async fn execute_due(&self, now: u64) -> Vec<(ScheduledTick, TickOutcome)> {
        let mut res = Vec::new();
        while let Some(tick) = self.pop_due(now) {
            let outcome = self.engine.execute(tick.campaign_id).await;
            res.push((tick, outcome));
        }
        res
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> AppResult<()> {
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis(),
            "tick worker started"
        );
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_once(now_ms());
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(pending = self.queue.lock().len(), "tick worker shutting down");
        Ok(())
    }
}
