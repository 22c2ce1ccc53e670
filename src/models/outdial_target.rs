//! Outdial target: one contactable entity with five destination slots.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Address, MAX_DESTINATION_SLOTS};

/// Target status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutdialTargetStatus {
    /// Eligible for another attempt.
    Idle,
    /// An attempt is in flight.
    Progressing,
    /// Reached; never dialed again.
    Done,
}

/// One destination and how often it has been tried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSlot {
    /// Destination, absent for unused slots.
    pub destination: Option<Address>,
    /// Attempts made on this slot.
    pub try_count: u32,
}

impl DestinationSlot {
    /// Slot with a destination and no attempts yet.
    #[must_use]
    pub const fn new(destination: Address) -> Self {
        Self {
            destination: Some(destination),
            try_count: 0,
        }
    }

    /// A slot is dialable while it has a destination and attempts left.
    #[must_use]
    pub const fn is_eligible(&self, max_try_count: u32) -> bool {
        self.destination.is_some() && self.try_count < max_try_count
    }
}

/// Outdial target row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdialTarget {
    /// Target id.
    pub id: Uuid,
    /// Owning outdial list.
    pub outdial_id: Uuid,
    /// Name.
    pub name: String,
    /// Detail.
    pub detail: String,
    /// Opaque customer data.
    pub data: String,
    /// Status.
    pub status: OutdialTargetStatus,
    /// Destination slots, tried in index order.
    pub slots: [DestinationSlot; MAX_DESTINATION_SLOTS],
    /// Creation time (ms since epoch).
    pub tm_create: u64,
    /// Last update time (ms since epoch).
    pub tm_update: u64,
    /// Soft-delete time (ms since epoch).
    pub tm_delete: Option<u64>,
}

impl OutdialTarget {
    /// True if any slot can still be dialed under the given caps.
    #[must_use]
    pub fn has_eligible_slot(&self, max_try_counts: &[u32; MAX_DESTINATION_SLOTS]) -> bool {
        self.slots
            .iter()
            .zip(max_try_counts)
            .any(|(slot, max)| slot.is_eligible(*max))
    }

    /// True once `try_interval_ms` has passed since the last attempt, or if
    /// the target was never touched since creation.
    #[must_use]
    pub const fn is_retry_due(&self, try_interval_ms: u64, now_ms: u64) -> bool {
        if self.tm_create == self.tm_update {
            return true;
        }
        self.tm_update <= now_ms.saturating_sub(try_interval_ms)
    }
}
