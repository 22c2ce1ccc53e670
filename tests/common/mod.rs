//! Shared fakes and fixtures for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use prometheus_campaign::builders::EngineBuilder;
use prometheus_campaign::config::EngineConfig;
use prometheus_campaign::core::{
    CallCreateRequest, CallService, CampaignCreate, CampaignEngine, CampaignError,
    CampaigncallRepository, DialInfo, ExecuteScheduler, FlowService, InMemoryNotifier,
    OutplanCreate, QueueService,
};
use prometheus_campaign::infra::{InMemoryCampaigncallRepository, InMemoryOutdialTargetStore};
use prometheus_campaign::models::{
    Action, Activeflow, ActiveflowReferenceType, Address, Agent, AgentStatus, Call, Campaign,
    CampaignType, Campaigncall, CampaigncallResult, CampaigncallStatus, DestinationSlot,
    EndHandle, Flow, HangupReason, Outdial, OutdialTarget, OutdialTargetStatus, Outplan, Queue,
};

/// Records call create requests.
#[derive(Default)]
pub struct FakeCallService {
    pub requests: Mutex<Vec<CallCreateRequest>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl CallService for FakeCallService {
    async fn create_call_with_id(&self, req: CallCreateRequest) -> Result<Call, CampaignError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CampaignError::Dependency("call service unavailable".into()));
        }
        let call = Call {
            id: req.call_id,
            customer_id: req.customer_id,
            flow_id: req.flow_id,
            activeflow_id: Some(req.activeflow_id),
            source: req.source.clone(),
            destination: req.destination.clone(),
            hangup_reason: HangupReason::None,
        };
        self.requests.lock().push(req);
        Ok(call)
    }
}

/// Records flow and activeflow requests.
#[derive(Default)]
pub struct FakeFlowService {
    pub flows: Mutex<Vec<Flow>>,
    pub deleted: Mutex<Vec<Uuid>>,
    pub activeflows: Mutex<Vec<Activeflow>>,
    pub executed: Mutex<Vec<Uuid>>,
    pub fail_activeflow: AtomicBool,
}

#[async_trait]
impl FlowService for FakeFlowService {
    async fn flow_create(
        &self,
        customer_id: Uuid,
        actions: Vec<Action>,
    ) -> Result<Flow, CampaignError> {
        let flow = Flow {
            id: Uuid::new_v4(),
            customer_id,
            actions,
        };
        self.flows.lock().push(flow.clone());
        Ok(flow)
    }

    async fn flow_update_actions(
        &self,
        flow_id: Uuid,
        actions: Vec<Action>,
    ) -> Result<Flow, CampaignError> {
        let mut flows = self.flows.lock();
        let flow = flows
            .iter_mut()
            .find(|f| f.id == flow_id)
            .ok_or_else(|| CampaignError::not_found("flow", flow_id))?;
        flow.actions = actions;
        Ok(flow.clone())
    }

    async fn flow_delete(&self, flow_id: Uuid) -> Result<(), CampaignError> {
        self.deleted.lock().push(flow_id);
        Ok(())
    }

    async fn activeflow_create(
        &self,
        activeflow_id: Uuid,
        flow_id: Uuid,
        reference_type: ActiveflowReferenceType,
        reference_id: Option<Uuid>,
    ) -> Result<Activeflow, CampaignError> {
        if self.fail_activeflow.load(Ordering::SeqCst) {
            return Err(CampaignError::Dependency("flow service unavailable".into()));
        }
        let af = Activeflow {
            id: activeflow_id,
            flow_id,
            reference_type,
            reference_id,
        };
        self.activeflows.lock().push(af.clone());
        Ok(af)
    }

    async fn activeflow_execute(&self, activeflow_id: Uuid) -> Result<(), CampaignError> {
        self.executed.lock().push(activeflow_id);
        Ok(())
    }
}

/// Returns a configurable number of available agents.
#[derive(Default)]
pub struct FakeQueueService {
    pub queues: Mutex<HashMap<Uuid, Queue>>,
    pub available: Mutex<usize>,
    pub fail: AtomicBool,
    /// Yield once before answering, so concurrent ticks interleave.
    pub yield_first: AtomicBool,
}

#[async_trait]
impl QueueService for FakeQueueService {
    async fn queue_get(&self, queue_id: Uuid) -> Result<Queue, CampaignError> {
        self.queues
            .lock()
            .get(&queue_id)
            .cloned()
            .ok_or_else(|| CampaignError::not_found("queue", queue_id))
    }

    async fn get_agents(
        &self,
        _queue_id: Uuid,
        status: AgentStatus,
    ) -> Result<Vec<Agent>, CampaignError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CampaignError::Dependency("queue service unavailable".into()));
        }
        if self.yield_first.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        let n = *self.available.lock();
        Ok((0..n)
            .map(|_| Agent {
                id: Uuid::new_v4(),
                customer_id: Uuid::nil(),
                status,
            })
            .collect())
    }
}

/// Records scheduled ticks instead of delivering them.
#[derive(Default)]
pub struct RecordingScheduler {
    pub scheduled: Mutex<Vec<(Uuid, u64)>>,
    pub fail: AtomicBool,
}

impl RecordingScheduler {
    pub fn delays(&self) -> Vec<u64> {
        self.scheduled.lock().iter().map(|(_, d)| *d).collect()
    }

    pub fn last_delay(&self) -> Option<u64> {
        self.scheduled.lock().last().map(|(_, d)| *d)
    }

    pub fn count(&self) -> usize {
        self.scheduled.lock().len()
    }
}

#[async_trait]
impl ExecuteScheduler for RecordingScheduler {
    async fn schedule_execute(
        &self,
        campaign_id: Uuid,
        delay_ms: u64,
    ) -> Result<(), CampaignError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CampaignError::Backend("broker unavailable".into()));
        }
        self.scheduled.lock().push((campaign_id, delay_ms));
        Ok(())
    }
}

/// In-memory campaigncall rows whose inserts can be made to fail.
#[derive(Default)]
pub struct FlakyCampaigncallRepository {
    pub inner: InMemoryCampaigncallRepository,
    pub fail_create: AtomicBool,
}

#[async_trait]
impl CampaigncallRepository for FlakyCampaigncallRepository {
    async fn campaigncall_create(&self, call: &Campaigncall) -> Result<(), CampaignError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(CampaignError::Backend("database unavailable".into()));
        }
        self.inner.campaigncall_create(call).await
    }

    async fn campaigncall_get(&self, id: Uuid) -> Result<Campaigncall, CampaignError> {
        self.inner.campaigncall_get(id).await
    }

    async fn campaigncall_get_by_reference_id(
        &self,
        reference_id: Uuid,
    ) -> Result<Campaigncall, CampaignError> {
        self.inner.campaigncall_get_by_reference_id(reference_id).await
    }

    async fn campaigncall_get_by_activeflow_id(
        &self,
        activeflow_id: Uuid,
    ) -> Result<Campaigncall, CampaignError> {
        self.inner.campaigncall_get_by_activeflow_id(activeflow_id).await
    }

    async fn campaigncall_list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        self.inner.campaigncall_list_by_customer(customer_id, limit).await
    }

    async fn campaigncall_list_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        self.inner.campaigncall_list_by_campaign(campaign_id, limit).await
    }

    async fn campaigncall_list_by_campaign_and_status(
        &self,
        campaign_id: Uuid,
        status: CampaigncallStatus,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        self.inner
            .campaigncall_list_by_campaign_and_status(campaign_id, status, limit)
            .await
    }

    async fn campaigncall_list_ongoing_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        self.inner
            .campaigncall_list_ongoing_by_campaign(campaign_id, limit)
            .await
    }

    async fn campaigncall_update_status(
        &self,
        id: Uuid,
        status: CampaigncallStatus,
    ) -> Result<(), CampaignError> {
        self.inner.campaigncall_update_status(id, status).await
    }

    async fn campaigncall_update_status_and_result(
        &self,
        id: Uuid,
        status: CampaigncallStatus,
        result: CampaigncallResult,
    ) -> Result<(), CampaignError> {
        self.inner
            .campaigncall_update_status_and_result(id, status, result)
            .await
    }
}

/// Engine wired to fakes and in-memory stores.
pub struct Harness {
    pub engine: Arc<CampaignEngine>,
    pub targets: Arc<InMemoryOutdialTargetStore>,
    pub calls: Arc<FakeCallService>,
    pub flows: Arc<FakeFlowService>,
    pub queues: Arc<FakeQueueService>,
    pub notifier: Arc<InMemoryNotifier>,
    pub customer_id: Uuid,
}

impl Harness {
    pub fn new(scheduler: Arc<dyn ExecuteScheduler>) -> Self {
        Self::with_campaigncalls(scheduler, Arc::new(InMemoryCampaigncallRepository::new()))
    }

    pub fn with_campaigncalls(
        scheduler: Arc<dyn ExecuteScheduler>,
        campaigncalls: Arc<dyn CampaigncallRepository>,
    ) -> Self {
        let targets = Arc::new(InMemoryOutdialTargetStore::new());
        let calls = Arc::new(FakeCallService::default());
        let flows = Arc::new(FakeFlowService::default());
        let queues = Arc::new(FakeQueueService::default());
        let notifier = Arc::new(InMemoryNotifier::new(1024));
        let engine = EngineBuilder::new()
            .with_config(EngineConfig::default())
            .with_targets(targets.clone())
            .with_outdials(targets.clone())
            .with_calls(calls.clone())
            .with_flows(flows.clone())
            .with_queues(queues.clone())
            .with_scheduler(scheduler)
            .with_campaigncalls(campaigncalls)
            .with_notifier(notifier.clone())
            .build()
            .unwrap();
        Self {
            engine: Arc::new(engine),
            targets,
            calls,
            flows,
            queues,
            notifier,
            customer_id: Uuid::new_v4(),
        }
    }

    pub async fn outplan(&self, max_try_counts: [u32; 5], try_interval_ms: u64) -> Outplan {
        self.engine
            .outplans()
            .create(OutplanCreate {
                customer_id: self.customer_id,
                name: "outplan".into(),
                detail: String::new(),
                dial: DialInfo {
                    source: Some(Address::tel("+821100000000")),
                    dial_timeout_ms: 30_000,
                    try_interval_ms,
                    max_try_counts,
                },
            })
            .await
            .unwrap()
    }

    /// Register an outdial owned by the harness customer, once.
    pub fn outdial(&self, outdial_id: Uuid) {
        let _ = self.targets.create_outdial(Outdial {
            id: outdial_id,
            customer_id: self.customer_id,
            campaign_id: None,
            name: "outdial".into(),
            tm_delete: None,
        });
    }

    /// Register a queue owned by the harness customer, once.
    pub fn queue(&self, queue_id: Uuid) {
        self.queues.queues.lock().entry(queue_id).or_insert(Queue {
            id: queue_id,
            customer_id: self.customer_id,
            tm_delete: None,
        });
    }

    /// Request for a campaign; referenced outdial and queue are registered.
    pub fn campaign_request(
        &self,
        campaign_type: CampaignType,
        outplan_id: Option<Uuid>,
        outdial_id: Option<Uuid>,
        queue_id: Option<Uuid>,
        end_handle: EndHandle,
    ) -> CampaignCreate {
        outdial_id.into_iter().for_each(|id| self.outdial(id));
        queue_id.into_iter().for_each(|id| self.queue(id));
        CampaignCreate {
            id: None,
            customer_id: self.customer_id,
            campaign_type,
            name: "campaign".into(),
            detail: String::new(),
            actions: vec![Action {
                action_type: "talk".into(),
                option: serde_json::json!({ "text": "hello" }),
            }],
            service_level: 100,
            end_handle,
            outplan_id,
            outdial_id,
            queue_id,
            next_campaign_id: None,
        }
    }

    pub async fn campaign(
        &self,
        campaign_type: CampaignType,
        outplan: &Outplan,
        outdial_id: Uuid,
        queue_id: Option<Uuid>,
        end_handle: EndHandle,
    ) -> Campaign {
        let req = self.campaign_request(
            campaign_type,
            Some(outplan.id),
            Some(outdial_id),
            queue_id,
            end_handle,
        );
        self.engine.create(req).await.unwrap()
    }

    /// Target with one destination per given number, created at `tm_create`.
    pub fn target(&self, outdial_id: Uuid, numbers: &[&str], tm_create: u64) -> OutdialTarget {
        let mut slots: [DestinationSlot; 5] = Default::default();
        for (slot, number) in slots.iter_mut().zip(numbers) {
            *slot = DestinationSlot::new(Address::tel(*number));
        }
        self.targets
            .create(OutdialTarget {
                id: Uuid::new_v4(),
                outdial_id,
                name: "target".into(),
                detail: String::new(),
                data: String::new(),
                status: OutdialTargetStatus::Idle,
                slots,
                tm_create,
                tm_update: tm_create,
                tm_delete: None,
            })
            .unwrap()
    }
}

/// A hung-up call as the call service would report it.
pub fn hungup(call_id: Uuid, reason: HangupReason) -> Call {
    Call {
        id: call_id,
        customer_id: Uuid::nil(),
        flow_id: None,
        activeflow_id: None,
        source: None,
        destination: Address::tel("+100"),
        hangup_reason: reason,
    }
}
