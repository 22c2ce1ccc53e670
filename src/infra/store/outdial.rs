//! In-memory outdial lists and targets.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::core::{CampaignError, OutdialStore, OutdialTargetStore};
use crate::models::{Outdial, OutdialTarget, OutdialTargetStatus, MAX_DESTINATION_SLOTS};
use crate::util::clock::now_ms;

/// Outdial lists and their targets held in maps.
///
/// The clock can be frozen so retry-interval behaviour is testable without
/// sleeping.
#[derive(Default)]
pub struct InMemoryOutdialTargetStore {
    outdials: RwLock<HashMap<Uuid, Outdial>>,
    rows: RwLock<HashMap<Uuid, OutdialTarget>>,
    frozen_now: Mutex<Option<u64>>,
}

impl InMemoryOutdialTargetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `now` instead of the wall clock; `None` restores the wall clock.
    pub fn freeze_clock(&self, now: Option<u64>) {
        *self.frozen_now.lock() = now;
    }

    fn now(&self) -> u64 {
        self.frozen_now.lock().unwrap_or_else(now_ms)
    }

    /// Insert an outdial list.
    pub fn create_outdial(&self, outdial: Outdial) -> Result<Outdial, CampaignError> {
        let mut outdials = self.outdials.write();
        if outdials.contains_key(&outdial.id) {
            return Err(CampaignError::InvalidArgument(format!(
                "outdial {} already exists",
                outdial.id
            )));
        }
        outdials.insert(outdial.id, outdial.clone());
        Ok(outdial)
    }

    /// Soft delete an outdial list.
    pub fn delete_outdial(&self, id: Uuid) -> Result<Outdial, CampaignError> {
        let now = self.now();
        let mut outdials = self.outdials.write();
        let outdial = outdials
            .get_mut(&id)
            .ok_or_else(|| CampaignError::not_found("outdial", id))?;
        outdial.tm_delete.get_or_insert(now);
        Ok(outdial.clone())
    }

    /// Insert a target.
    pub fn create(&self, target: OutdialTarget) -> Result<OutdialTarget, CampaignError> {
        let mut rows = self.rows.write();
        if rows.contains_key(&target.id) {
            return Err(CampaignError::InvalidArgument(format!(
                "outdial target {} already exists",
                target.id
            )));
        }
        rows.insert(target.id, target.clone());
        Ok(target)
    }

    /// Fetch a target.
    pub fn get(&self, id: Uuid) -> Result<OutdialTarget, CampaignError> {
        self.rows
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CampaignError::not_found("outdial_target", id))
    }

    /// Non-deleted targets of an outdial list, oldest first.
    pub fn list_by_outdial(&self, outdial_id: Uuid) -> Vec<OutdialTarget> {
        let mut res: Vec<_> = self
            .rows
            .read()
            .values()
            .filter(|t| t.outdial_id == outdial_id && t.tm_delete.is_none())
            .cloned()
            .collect();
        res.sort_by_key(|t| t.tm_create);
        res
    }

    /// Availability query evaluated at an explicit time.
    pub fn get_available_at(
        &self,
        outdial_id: Uuid,
        max_try_counts: &[u32; MAX_DESTINATION_SLOTS],
        try_interval_ms: u64,
        limit: usize,
        now: u64,
    ) -> Vec<OutdialTarget> {
        let mut res: Vec<_> = self
            .rows
            .read()
            .values()
            .filter(|t| {
                t.outdial_id == outdial_id
                    && t.tm_delete.is_none()
                    && t.status == OutdialTargetStatus::Idle
                    && t.has_eligible_slot(max_try_counts)
                    && t.is_retry_due(try_interval_ms, now)
            })
            .cloned()
            .collect();
        res.sort_by_key(|t| (t.tm_update, t.tm_create));
        res.truncate(limit);
        res
    }

    fn touch(target: &mut OutdialTarget, now: u64) {
        // A touched target must never look untouched to the retry check.
        target.tm_update = now.max(target.tm_create + 1);
    }
}

#[async_trait]
impl OutdialStore for InMemoryOutdialTargetStore {
    async fn outdial_get(&self, outdial_id: Uuid) -> Result<Outdial, CampaignError> {
        self.outdials
            .read()
            .get(&outdial_id)
            .cloned()
            .ok_or_else(|| CampaignError::not_found("outdial", outdial_id))
    }

    async fn outdial_update_campaign_id(
        &self,
        outdial_id: Uuid,
        campaign_id: Option<Uuid>,
    ) -> Result<Outdial, CampaignError> {
        let mut outdials = self.outdials.write();
        let outdial = outdials
            .get_mut(&outdial_id)
            .ok_or_else(|| CampaignError::not_found("outdial", outdial_id))?;
        if let (Some(held), Some(wanted)) = (outdial.campaign_id, campaign_id) {
            if held != wanted {
                return Err(CampaignError::InvalidArgument(format!(
                    "outdial {outdial_id} is used by campaign {held}"
                )));
            }
        }
        outdial.campaign_id = campaign_id;
        Ok(outdial.clone())
    }
}

#[async_trait]
impl OutdialTargetStore for InMemoryOutdialTargetStore {
    async fn get_available(
        &self,
        outdial_id: Uuid,
        max_try_counts: [u32; MAX_DESTINATION_SLOTS],
        try_interval_ms: u64,
        limit: usize,
    ) -> Result<Vec<OutdialTarget>, CampaignError> {
        Ok(self.get_available_at(
            outdial_id,
            &max_try_counts,
            try_interval_ms,
            limit,
            self.now(),
        ))
    }

    async fn update_status(
        &self,
        target_id: Uuid,
        status: OutdialTargetStatus,
    ) -> Result<(), CampaignError> {
        let now = self.now();
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&target_id)
            .ok_or_else(|| CampaignError::not_found("outdial_target", target_id))?;
        row.status = status;
        Self::touch(row, now);
        Ok(())
    }

    async fn update_progressing(
        &self,
        target_id: Uuid,
        index: usize,
        expected_try_count: u32,
    ) -> Result<(), CampaignError> {
        let now = self.now();
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&target_id)
            .ok_or_else(|| CampaignError::not_found("outdial_target", target_id))?;
        let slot = row.slots.get_mut(index).ok_or_else(|| {
            CampaignError::InvalidArgument(format!("slot index {index} out of range"))
        })?;
        if row.status != OutdialTargetStatus::Idle || slot.try_count != expected_try_count {
            return Err(CampaignError::SlotConflict { target_id, index });
        }
        slot.try_count += 1;
        row.status = OutdialTargetStatus::Progressing;
        Self::touch(row, now);
        Ok(())
    }

    async fn release_claim(
        &self,
        target_id: Uuid,
        index: usize,
        claimed_try_count: u32,
    ) -> Result<(), CampaignError> {
        let now = self.now();
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&target_id)
            .ok_or_else(|| CampaignError::not_found("outdial_target", target_id))?;
        let slot = row.slots.get_mut(index).ok_or_else(|| {
            CampaignError::InvalidArgument(format!("slot index {index} out of range"))
        })?;
        if row.status != OutdialTargetStatus::Progressing
            || claimed_try_count == 0
            || slot.try_count != claimed_try_count
        {
            return Err(CampaignError::SlotConflict { target_id, index });
        }
        slot.try_count -= 1;
        row.status = OutdialTargetStatus::Idle;
        Self::touch(row, now);
        Ok(())
    }
}
