//! Outdial ports and destination slot selection.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::CampaignError;
use crate::models::{Address, Outdial, OutdialTarget, OutdialTargetStatus, MAX_DESTINATION_SLOTS};

/// Outdial lists and the campaign each one is bound to.
#[async_trait]
pub trait OutdialStore: Send + Sync {
    /// Fetch an outdial list.
    async fn outdial_get(&self, outdial_id: Uuid) -> Result<Outdial, CampaignError>;

    /// Bind the list to `campaign_id`, or release it with `None`. Binding a
    /// list held by another campaign fails with
    /// [`CampaignError::InvalidArgument`].
    async fn outdial_update_campaign_id(
        &self,
        outdial_id: Uuid,
        campaign_id: Option<Uuid>,
    ) -> Result<Outdial, CampaignError>;
}

/// Store holding outdial targets and their per-slot try counters.
#[async_trait]
pub trait OutdialTargetStore: Send + Sync {
    /// Up to `limit` idle targets of `outdial_id` that still have an eligible
    /// slot under `max_try_counts` and were not attempted within
    /// `try_interval_ms`, least recently touched first.
    async fn get_available(
        &self,
        outdial_id: Uuid,
        max_try_counts: [u32; MAX_DESTINATION_SLOTS],
        try_interval_ms: u64,
        limit: usize,
    ) -> Result<Vec<OutdialTarget>, CampaignError>;

    /// Persist the target status derived from an attempt outcome.
    async fn update_status(
        &self,
        target_id: Uuid,
        status: OutdialTargetStatus,
    ) -> Result<(), CampaignError>;

    /// Claim slot `index` for a new attempt: bump its try count and mark the
    /// target progressing, but only if the count still equals
    /// `expected_try_count`. Otherwise fails with
    /// [`CampaignError::SlotConflict`] and changes nothing.
    async fn update_progressing(
        &self,
        target_id: Uuid,
        index: usize,
        expected_try_count: u32,
    ) -> Result<(), CampaignError>;

    /// Undo a claim that never produced an attempt: if the target is still
    /// progressing with slot `index` at `claimed_try_count`, step the count
    /// back and return the target to idle. Otherwise fails with
    /// [`CampaignError::SlotConflict`] and changes nothing.
    async fn release_claim(
        &self,
        target_id: Uuid,
        index: usize,
        claimed_try_count: u32,
    ) -> Result<(), CampaignError>;
}

/// Destination picked for the next attempt on a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDestination {
    /// Address to dial.
    pub destination: Address,
    /// Slot index.
    pub index: usize,
    /// Attempt number this dispatch will be (current count + 1).
    pub try_count: u32,
}

/// Pick the first slot with a destination and attempts left.
///
/// Scans slots in index order; no balancing across slots.
#[must_use]
pub fn select_destination(
    target: &OutdialTarget,
    max_try_counts: &[u32; MAX_DESTINATION_SLOTS],
) -> Option<SelectedDestination> {
    target
        .slots
        .iter()
        .zip(max_try_counts)
        .enumerate()
        .find_map(|(index, (slot, max))| {
            if !slot.is_eligible(*max) {
                return None;
            }
            slot.destination.as_ref().map(|destination| SelectedDestination {
                destination: destination.clone(),
                index,
                try_count: slot.try_count + 1,
            })
        })
}
