//! Campaign: an outbound dialing job bound to an outplan and an outdial list.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Webhook event type published when a campaign is created.
pub const EVENT_CAMPAIGN_CREATED: &str = "campaign_created";
/// Webhook event type published when a campaign is updated.
pub const EVENT_CAMPAIGN_UPDATED: &str = "campaign_updated";
/// Webhook event type published when a campaign is deleted.
pub const EVENT_CAMPAIGN_DELETED: &str = "campaign_deleted";

/// What a dispatched attempt does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignType {
    /// Place an outbound call that runs the campaign flow once answered.
    Call,
    /// Run the campaign flow directly, no call leg.
    Flow,
}

/// Campaign status.
///
/// `Running` is accepted on the wire but never entered by this engine; a
/// campaign found in it is treated like any other non-`Run` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Halted.
    Stop,
    /// Stop requested; waiting for ongoing campaigncalls to finish.
    Stopping,
    /// Ticks are dispatching.
    Run,
    /// Legacy variant.
    Running,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stop => "stop",
            Self::Stopping => "stopping",
            Self::Run => "run",
            Self::Running => "running",
        };
        f.write_str(s)
    }
}

/// Whether a tick chain is currently alive for the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Execute {
    /// A tick has been scheduled and the chain is alive.
    Run,
    /// No further ticks.
    Stop,
}

/// Behaviour once the outdial list has no eligible target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndHandle {
    /// Stop the campaign.
    Stop,
    /// Keep polling for targets that become eligible again.
    Continue,
}

/// Flow action attached to the campaign flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action type, e.g. `talk` or `queue_join`.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Type-specific option object.
    #[serde(default)]
    pub option: serde_json::Value,
}

impl Action {
    /// Action that hands the answered call to a queue.
    #[must_use]
    pub fn queue_join(queue_id: Uuid) -> Self {
        Self {
            action_type: "queue_join".into(),
            option: serde_json::json!({ "queue_id": queue_id }),
        }
    }
}

/// Campaign row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Dispatch kind.
    #[serde(rename = "type")]
    pub campaign_type: CampaignType,
    /// Name.
    pub name: String,
    /// Detail.
    pub detail: String,
    /// Status.
    pub status: CampaignStatus,
    /// Tick chain flag.
    pub execute: Execute,
    /// Percentage (0-100) of available agents that may be occupied by dialing.
    pub service_level: u32,
    /// Behaviour on an exhausted outdial list.
    pub end_handle: EndHandle,
    /// Flow created for this campaign.
    pub flow_id: Option<Uuid>,
    /// Actions the campaign flow was built from.
    pub actions: Vec<Action>,
    /// Dial policy.
    pub outplan_id: Option<Uuid>,
    /// Target list.
    pub outdial_id: Option<Uuid>,
    /// Queue whose available agents throttle dispatch.
    pub queue_id: Option<Uuid>,
    /// Campaign to chain to.
    pub next_campaign_id: Option<Uuid>,
    /// Creation time (ms since epoch).
    pub tm_create: u64,
    /// Last update time (ms since epoch).
    pub tm_update: u64,
    /// Soft-delete time (ms since epoch).
    pub tm_delete: Option<u64>,
}

impl Campaign {
    /// A campaign can only run once it knows both its policy and its list.
    #[must_use]
    pub const fn has_dial_resources(&self) -> bool {
        self.outplan_id.is_some() && self.outdial_id.is_some()
    }

    /// Soft-deleted rows are kept but must not be used.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.tm_delete.is_some()
    }
}
