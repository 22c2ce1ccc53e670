//! Campaign engine: campaign lifecycle, the per-tick dispatch step and the
//! handling of call/flow outcome events.
//!
//! The engine holds no per-campaign state between ticks. Every tick re-reads
//! the campaign, its outplan, the agent count and the target list, decides,
//! and finishes by scheduling the next tick or halting the campaign. A tick
//! is driven by an external delivery of `execute(campaign_id)`, so the same
//! engine can serve any number of campaigns from any number of processes.

mod events;
mod execute;
mod lifecycle;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::core::notify::Notifier;
use crate::core::{
    CallService, CampaignRepository, CampaigncallTracker, ExecuteScheduler, FlowService,
    OutdialStore, OutdialTargetStore, OutplanHandler, QueueService,
};

pub use events::InboundEvent;
pub use execute::{BackoffReason, HaltReason, TickOutcome};
pub use lifecycle::{BasicInfo, CampaignCreate, ResourceInfo};

/// Everything the engine talks to.
pub struct EngineParts {
    /// Campaign rows.
    pub campaigns: Arc<dyn CampaignRepository>,
    /// Outplan handler.
    pub outplans: Arc<OutplanHandler>,
    /// Campaigncall tracker.
    pub campaigncalls: Arc<CampaigncallTracker>,
    /// Outdial lists.
    pub outdials: Arc<dyn OutdialStore>,
    /// Outdial target store.
    pub targets: Arc<dyn OutdialTargetStore>,
    /// Call service.
    pub calls: Arc<dyn CallService>,
    /// Flow service.
    pub flows: Arc<dyn FlowService>,
    /// Queue/agent service.
    pub queues: Arc<dyn QueueService>,
    /// Self-dispatch.
    pub scheduler: Arc<dyn ExecuteScheduler>,
    /// Webhook notifier.
    pub notifier: Arc<dyn Notifier>,
}

/// Outbound dialing campaign engine.
pub struct CampaignEngine {
    config: EngineConfig,
    campaigns: Arc<dyn CampaignRepository>,
    outplans: Arc<OutplanHandler>,
    campaigncalls: Arc<CampaigncallTracker>,
    outdials: Arc<dyn OutdialStore>,
    targets: Arc<dyn OutdialTargetStore>,
    calls: Arc<dyn CallService>,
    flows: Arc<dyn FlowService>,
    queues: Arc<dyn QueueService>,
    scheduler: Arc<dyn ExecuteScheduler>,
    notifier: Arc<dyn Notifier>,
    /// Campaigns with a tick currently executing in this process.
    in_flight: Mutex<HashSet<Uuid>>,
}

impl CampaignEngine {
    /// Create an engine from its collaborators.
    pub fn new(config: EngineConfig, parts: EngineParts) -> Self {
        Self {
            config,
            campaigns: parts.campaigns,
            outplans: parts.outplans,
            campaigncalls: parts.campaigncalls,
            outdials: parts.outdials,
            targets: parts.targets,
            calls: parts.calls,
            flows: parts.flows,
            queues: parts.queues,
            scheduler: parts.scheduler,
            notifier: parts.notifier,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Pacing configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Outplan handler the engine reads policies from.
    pub fn outplans(&self) -> &OutplanHandler {
        &self.outplans
    }

    /// Campaigncall tracker.
    pub fn campaigncalls(&self) -> &CampaigncallTracker {
        &self.campaigncalls
    }

    fn enter_tick(&self, campaign_id: Uuid) -> Option<TickGuard<'_>> {
        if self.in_flight.lock().insert(campaign_id) {
            Some(TickGuard {
                in_flight: &self.in_flight,
                campaign_id,
            })
        } else {
            None
        }
    }
}

/// Marks a campaign's tick as in flight until dropped.
struct TickGuard<'a> {
    in_flight: &'a Mutex<HashSet<Uuid>>,
    campaign_id: Uuid,
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.campaign_id);
    }
}
