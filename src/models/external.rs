//! Shapes owned by the call, flow, queue and outdial services, trimmed to the
//! fields this engine reads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Action, Address};

/// Why a call ended, as reported by the call service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HangupReason {
    /// Not hung up yet.
    #[serde(rename = "")]
    None,
    /// Ended after answer.
    Normal,
    /// Signal never reached the network.
    Failed,
    /// Destination busy.
    Busy,
    /// Originator cancelled before answer.
    #[serde(rename = "cancel")]
    Canceled,
    /// Max call duration reached after answer.
    Timeout,
    /// Rejected with no answer.
    Noanswer,
    /// Dial timeout fired before answer.
    Dialout,
    /// Answering-machine detection hung up.
    Amd,
    /// Anything this engine does not know.
    #[serde(other)]
    Unknown,
}

/// Call as reported on hangup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Call id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Flow executed on answer.
    pub flow_id: Option<Uuid>,
    /// Activeflow executed on answer.
    pub activeflow_id: Option<Uuid>,
    /// Caller id.
    pub source: Option<Address>,
    /// Callee.
    pub destination: Address,
    /// Hangup reason.
    #[serde(default = "hangup_reason_none")]
    pub hangup_reason: HangupReason,
}

const fn hangup_reason_none() -> HangupReason {
    HangupReason::None
}

/// Flow definition created for a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Flow id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Actions.
    pub actions: Vec<Action>,
}

/// What an activeflow is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveflowReferenceType {
    /// Free-standing.
    None,
    /// A call.
    Call,
}

/// Running instance of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activeflow {
    /// Activeflow id.
    pub id: Uuid,
    /// Flow being executed.
    pub flow_id: Uuid,
    /// Reference kind.
    pub reference_type: ActiveflowReferenceType,
    /// Reference id.
    pub reference_id: Option<Uuid>,
}

/// Agent presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Can take a call.
    Available,
    /// Away.
    Away,
    /// On a call.
    Busy,
    /// Logged out.
    Offline,
    /// Being rung.
    Ringing,
}

/// Queue member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Presence.
    pub status: AgentStatus,
}

/// Outdial list as reported by the outdial service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outdial {
    /// Outdial id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Campaign currently dialing this list, if any.
    pub campaign_id: Option<Uuid>,
    /// Name.
    #[serde(default)]
    pub name: String,
    /// Deletion time.
    pub tm_delete: Option<u64>,
}

impl Outdial {
    /// True once soft deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.tm_delete.is_some()
    }
}

/// Agent queue as reported by the queue service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    /// Queue id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Deletion time.
    pub tm_delete: Option<u64>,
}

impl Queue {
    /// True once soft deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.tm_delete.is_some()
    }
}
