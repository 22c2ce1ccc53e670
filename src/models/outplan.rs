//! Outplan: the dial policy a campaign reads on every tick.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Address;

/// Number of alternate destinations per target.
pub const MAX_DESTINATION_SLOTS: usize = 5;

/// Webhook event type published when an outplan is created.
pub const EVENT_OUTPLAN_CREATED: &str = "outplan_created";
/// Webhook event type published when an outplan is updated.
pub const EVENT_OUTPLAN_UPDATED: &str = "outplan_updated";
/// Webhook event type published when an outplan is deleted.
pub const EVENT_OUTPLAN_DELETED: &str = "outplan_deleted";

/// Outplan row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outplan {
    /// Outplan id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Name.
    pub name: String,
    /// Detail.
    pub detail: String,
    /// Caller id used for every dispatched attempt.
    pub source: Option<Address>,
    /// Dial timeout in milliseconds.
    pub dial_timeout_ms: u64,
    /// Minimum time between two attempts on the same target.
    pub try_interval_ms: u64,
    /// Attempt cap per destination slot.
    pub max_try_counts: [u32; MAX_DESTINATION_SLOTS],
    /// Creation time (ms since epoch).
    pub tm_create: u64,
    /// Last update time (ms since epoch).
    pub tm_update: u64,
    /// Soft-delete time (ms since epoch).
    pub tm_delete: Option<u64>,
}

impl Outplan {
    /// Soft-deleted rows are kept but must not be used.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.tm_delete.is_some()
    }
}
