//! Builder assembling a [`CampaignEngine`] from its ports.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::core::{
    CallService, CampaignEngine, CampaignError, CampaignRepository, CampaigncallRepository,
    CampaigncallTracker, EngineParts, ExecuteScheduler, FlowService, Notifier,
    OutdialStore, OutdialTargetStore, OutplanHandler, OutplanRepository, QueueService, TracingNotifier,
};
use crate::infra::{
    InMemoryCampaignRepository, InMemoryCampaigncallRepository, InMemoryOutplanRepository,
};

/// Builds a [`CampaignEngine`].
///
/// Collaborator services, the outdial and target stores and the scheduler
/// are required.
/// Row repositories default to the in-memory ones and the notifier to
/// [`TracingNotifier`].
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    campaigns: Option<Arc<dyn CampaignRepository>>,
    outplans: Option<Arc<dyn OutplanRepository>>,
    campaigncalls: Option<Arc<dyn CampaigncallRepository>>,
    outdials: Option<Arc<dyn OutdialStore>>,
    targets: Option<Arc<dyn OutdialTargetStore>>,
    calls: Option<Arc<dyn CallService>>,
    flows: Option<Arc<dyn FlowService>>,
    queues: Option<Arc<dyn QueueService>>,
    scheduler: Option<Arc<dyn ExecuteScheduler>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl EngineBuilder {
    /// Start from the default engine config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pacing configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Campaign repository.
    #[must_use]
    pub fn with_campaigns(mut self, repo: Arc<dyn CampaignRepository>) -> Self {
        self.campaigns = Some(repo);
        self
    }

    /// Outplan repository.
    #[must_use]
    pub fn with_outplans(mut self, repo: Arc<dyn OutplanRepository>) -> Self {
        self.outplans = Some(repo);
        self
    }

    /// Campaigncall repository.
    #[must_use]
    pub fn with_campaigncalls(mut self, repo: Arc<dyn CampaigncallRepository>) -> Self {
        self.campaigncalls = Some(repo);
        self
    }

    /// Outdial list store.
    #[must_use]
    pub fn with_outdials(mut self, store: Arc<dyn OutdialStore>) -> Self {
        self.outdials = Some(store);
        self
    }

    /// Outdial target store.
    #[must_use]
    pub fn with_targets(mut self, store: Arc<dyn OutdialTargetStore>) -> Self {
        self.targets = Some(store);
        self
    }

    /// Call service.
    #[must_use]
    pub fn with_calls(mut self, calls: Arc<dyn CallService>) -> Self {
        self.calls = Some(calls);
        self
    }

    /// Flow service.
    #[must_use]
    pub fn with_flows(mut self, flows: Arc<dyn FlowService>) -> Self {
        self.flows = Some(flows);
        self
    }

    /// Queue/agent service.
    #[must_use]
    pub fn with_queues(mut self, queues: Arc<dyn QueueService>) -> Self {
        self.queues = Some(queues);
        self
    }

    /// Tick scheduler.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn ExecuteScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Webhook notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Validate the config and assemble the engine.
    pub fn build(self) -> Result<CampaignEngine, CampaignError> {
        self.config
            .validate()
            .map_err(|e| CampaignError::InvalidArgument(format!("engine config invalid: {e}")))?;

        let outdials = self.outdials.ok_or_else(|| missing("outdial store"))?;
        let targets = self.targets.ok_or_else(|| missing("outdial target store"))?;
        let calls = self.calls.ok_or_else(|| missing("call service"))?;
        let flows = self.flows.ok_or_else(|| missing("flow service"))?;
        let queues = self.queues.ok_or_else(|| missing("queue service"))?;
        let scheduler = self.scheduler.ok_or_else(|| missing("scheduler"))?;

        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier) as Arc<dyn Notifier>);
        let campaigns = self
            .campaigns
            .unwrap_or_else(|| Arc::new(InMemoryCampaignRepository::new()));
        let outplans = self
            .outplans
            .unwrap_or_else(|| Arc::new(InMemoryOutplanRepository::new()));
        let campaigncalls = self
            .campaigncalls
            .unwrap_or_else(|| Arc::new(InMemoryCampaigncallRepository::new()));

        let parts = EngineParts {
            campaigns,
            outplans: Arc::new(OutplanHandler::new(outplans, Arc::clone(&notifier))),
            campaigncalls: Arc::new(CampaigncallTracker::new(
                campaigncalls,
                Arc::clone(&targets),
                Arc::clone(&notifier),
            )),
            outdials,
            targets,
            calls,
            flows,
            queues,
            scheduler,
            notifier,
        };
        Ok(CampaignEngine::new(self.config, parts))
    }
}

fn missing(what: &str) -> CampaignError {
    CampaignError::InvalidArgument(format!("engine builder: missing {what}"))
}
