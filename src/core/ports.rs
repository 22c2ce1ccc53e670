//! Collaborator services the engine calls out to.
//!
//! Transport and framing live outside this crate; implement these traits on
//! top of whatever RPC client the deployment uses.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::CampaignError;
use crate::models::{
    Action, Activeflow, ActiveflowReferenceType, Address, Agent, AgentStatus, Call, Flow, Queue,
};

/// Parameters for creating an outbound call with a caller-chosen id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallCreateRequest {
    /// Call id, chosen up front so the campaigncall can reference it.
    pub call_id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Flow to execute once answered.
    pub flow_id: Option<Uuid>,
    /// Activeflow id to use for that flow.
    pub activeflow_id: Uuid,
    /// Master call to bridge with, if any.
    pub master_call_id: Option<Uuid>,
    /// Caller id.
    pub source: Option<Address>,
    /// Callee.
    pub destination: Address,
}

/// Call service.
#[async_trait]
pub trait CallService: Send + Sync {
    /// Create a call with the id given in `req`.
    async fn create_call_with_id(&self, req: CallCreateRequest) -> Result<Call, CampaignError>;
}

/// Flow service.
#[async_trait]
pub trait FlowService: Send + Sync {
    /// Create a flow owned by the customer.
    async fn flow_create(&self, customer_id: Uuid, actions: Vec<Action>)
        -> Result<Flow, CampaignError>;

    /// Replace a flow's actions.
    async fn flow_update_actions(
        &self,
        flow_id: Uuid,
        actions: Vec<Action>,
    ) -> Result<Flow, CampaignError>;

    /// Delete a flow.
    async fn flow_delete(&self, flow_id: Uuid) -> Result<(), CampaignError>;

    /// Create an activeflow for `flow_id` with a caller-chosen id.
    async fn activeflow_create(
        &self,
        activeflow_id: Uuid,
        flow_id: Uuid,
        reference_type: ActiveflowReferenceType,
        reference_id: Option<Uuid>,
    ) -> Result<Activeflow, CampaignError>;

    /// Start executing an activeflow.
    async fn activeflow_execute(&self, activeflow_id: Uuid) -> Result<(), CampaignError>;
}

/// Queue/agent service.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Fetch a queue.
    async fn queue_get(&self, queue_id: Uuid) -> Result<Queue, CampaignError>;

    /// Agents of `queue_id` currently in `status`.
    async fn get_agents(&self, queue_id: Uuid, status: AgentStatus)
        -> Result<Vec<Agent>, CampaignError>;
}
