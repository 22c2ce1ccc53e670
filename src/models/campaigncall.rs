//! Campaigncall: one dispatched attempt for one target slot.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Address;

/// Webhook event type published when a campaigncall is created.
pub const EVENT_CAMPAIGNCALL_CREATED: &str = "campaigncall_created";
/// Webhook event type published when a campaigncall is updated.
pub const EVENT_CAMPAIGNCALL_UPDATED: &str = "campaigncall_updated";

/// What the attempt's `reference_id` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    /// Nothing yet.
    None,
    /// A call in the call service.
    Call,
    /// An activeflow in the flow service.
    Flow,
}

/// Attempt lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaigncallStatus {
    /// Dispatched, not yet connected.
    Dialing,
    /// Connected or flow running.
    Progressing,
    /// Finished with a result.
    Done,
}

impl fmt::Display for CampaigncallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Dialing => "dialing",
            Self::Progressing => "progressing",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Attempt outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaigncallResult {
    /// Not finished.
    None,
    /// Reached the destination.
    Success,
    /// Did not reach the destination; the target may be retried.
    Fail,
}

/// Campaigncall row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaigncall {
    /// Campaigncall id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Campaign that dispatched the attempt.
    pub campaign_id: Uuid,
    /// Dial policy in force at dispatch.
    pub outplan_id: Uuid,
    /// Target list.
    pub outdial_id: Uuid,
    /// Dialed target.
    pub outdial_target_id: Uuid,
    /// Throttling queue, if any.
    pub queue_id: Option<Uuid>,
    /// Activeflow bound to the attempt.
    pub activeflow_id: Uuid,
    /// Campaign flow.
    pub flow_id: Option<Uuid>,
    /// Kind of `reference_id`.
    pub reference_type: ReferenceType,
    /// Call id for call campaigns.
    pub reference_id: Option<Uuid>,
    /// Status.
    pub status: CampaigncallStatus,
    /// Caller id.
    pub source: Option<Address>,
    /// Dialed destination.
    pub destination: Address,
    /// Slot the destination came from. Fixed for the row's lifetime.
    pub destination_index: usize,
    /// Attempt number on that slot, starting at 1.
    pub try_count: u32,
    /// Outcome.
    pub result: CampaigncallResult,
    /// Creation time (ms since epoch).
    pub tm_create: u64,
    /// Last update time (ms since epoch).
    pub tm_update: u64,
}

impl Campaigncall {
    /// Dialing and progressing attempts still occupy capacity.
    #[must_use]
    pub const fn is_ongoing(&self) -> bool {
        matches!(
            self.status,
            CampaigncallStatus::Dialing | CampaigncallStatus::Progressing
        )
    }
}
