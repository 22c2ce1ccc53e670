//! Error types for campaign operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the campaign engine and its stores.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// A campaign, outplan, campaigncall or outdial target does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind (`campaign`, `outplan`, ...).
        kind: &'static str,
        /// Identifier that was looked up.
        id: Uuid,
    },
    /// Caller supplied a value the operation cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Requested status change is not allowed from the current status.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
    /// Hangup reason outside the known mapping table.
    #[error("unknown hangup reason: {0}")]
    UnknownHangupReason(String),
    /// Another dispatcher advanced the slot first.
    #[error("slot conflict: target {target_id} slot {index}")]
    SlotConflict {
        /// Outdial target whose slot was contended.
        target_id: Uuid,
        /// Slot index.
        index: usize,
    },
    /// A collaborator service (call, flow, queue) failed.
    #[error("dependency error: {0}")]
    Dependency(String),
    /// Store or queue backend failure with context.
    #[error("backend error: {0}")]
    Backend(String),
    /// Tick queue is full.
    #[error("queue full: {0}")]
    QueueFull(String),
}

impl CampaignError {
    /// Shorthand for a not-found error.
    #[must_use]
    pub const fn not_found(kind: &'static str, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// True for errors caused by concurrent dispatchers rather than failures.
    #[must_use]
    pub const fn is_contention(&self) -> bool {
        matches!(self, Self::SlotConflict { .. })
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
