//! In-memory repositories keyed by id.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::core::{
    CampaignError, CampaignRepository, CampaigncallRepository, OutplanRepository,
};
use crate::models::{
    Campaign, CampaignStatus, Campaigncall, CampaigncallResult, CampaigncallStatus, Execute,
    Outplan,
};
use crate::util::clock::now_ms;

fn newest_first<T, F>(mut rows: Vec<T>, tm_create: F, limit: usize) -> Vec<T>
where
    F: Fn(&T) -> u64,
{
    rows.sort_by_key(|r| std::cmp::Reverse(tm_create(r)));
    rows.truncate(limit);
    rows
}

/// Campaign rows held in a map.
#[derive(Default)]
pub struct InMemoryCampaignRepository {
    rows: RwLock<HashMap<Uuid, Campaign>>,
}

impl InMemoryCampaignRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn modify<F>(&self, id: Uuid, f: F) -> Result<(), CampaignError>
    where
        F: FnOnce(&mut Campaign),
    {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| CampaignError::not_found("campaign", id))?;
        f(row);
        row.tm_update = now_ms();
        Ok(())
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn campaign_create(&self, campaign: &Campaign) -> Result<(), CampaignError> {
        let mut rows = self.rows.write();
        if rows.contains_key(&campaign.id) {
            return Err(CampaignError::InvalidArgument(format!(
                "campaign {} already exists",
                campaign.id
            )));
        }
        rows.insert(campaign.id, campaign.clone());
        Ok(())
    }

    async fn campaign_get(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        self.rows
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CampaignError::not_found("campaign", id))
    }

    async fn campaign_list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaign>, CampaignError> {
        let rows: Vec<_> = self
            .rows
            .read()
            .values()
            .filter(|c| c.customer_id == customer_id && !c.is_deleted())
            .cloned()
            .collect();
        Ok(newest_first(rows, |c| c.tm_create, limit))
    }

    async fn campaign_update_info(&self, campaign: &Campaign) -> Result<(), CampaignError> {
        self.modify(campaign.id, |row| {
            row.campaign_type = campaign.campaign_type;
            row.name.clone_from(&campaign.name);
            row.detail.clone_from(&campaign.detail);
            row.service_level = campaign.service_level;
            row.end_handle = campaign.end_handle;
            row.actions.clone_from(&campaign.actions);
            row.outplan_id = campaign.outplan_id;
            row.outdial_id = campaign.outdial_id;
            row.queue_id = campaign.queue_id;
            row.next_campaign_id = campaign.next_campaign_id;
        })
    }

    async fn campaign_update_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
    ) -> Result<(), CampaignError> {
        self.modify(id, |row| row.status = status)
    }

    async fn campaign_update_execute(
        &self,
        id: Uuid,
        execute: Execute,
    ) -> Result<(), CampaignError> {
        self.modify(id, |row| row.execute = execute)
    }

    async fn campaign_delete(&self, id: Uuid) -> Result<(), CampaignError> {
        let now = now_ms();
        self.modify(id, |row| row.tm_delete = Some(now))
    }
}

/// Outplan rows held in a map.
#[derive(Default)]
pub struct InMemoryOutplanRepository {
    rows: RwLock<HashMap<Uuid, Outplan>>,
}

impl InMemoryOutplanRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutplanRepository for InMemoryOutplanRepository {
    async fn outplan_create(&self, outplan: &Outplan) -> Result<(), CampaignError> {
        let mut rows = self.rows.write();
        if rows.contains_key(&outplan.id) {
            return Err(CampaignError::InvalidArgument(format!(
                "outplan {} already exists",
                outplan.id
            )));
        }
        rows.insert(outplan.id, outplan.clone());
        Ok(())
    }

    async fn outplan_get(&self, id: Uuid) -> Result<Outplan, CampaignError> {
        self.rows
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CampaignError::not_found("outplan", id))
    }

    async fn outplan_list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Outplan>, CampaignError> {
        let rows: Vec<_> = self
            .rows
            .read()
            .values()
            .filter(|p| p.customer_id == customer_id && !p.is_deleted())
            .cloned()
            .collect();
        Ok(newest_first(rows, |p| p.tm_create, limit))
    }

    async fn outplan_update(&self, outplan: &Outplan) -> Result<(), CampaignError> {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&outplan.id)
            .ok_or_else(|| CampaignError::not_found("outplan", outplan.id))?;
        *row = Outplan {
            tm_create: row.tm_create,
            tm_delete: row.tm_delete,
            ..outplan.clone()
        };
        Ok(())
    }

    async fn outplan_delete(&self, id: Uuid) -> Result<(), CampaignError> {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| CampaignError::not_found("outplan", id))?;
        let now = now_ms();
        row.tm_delete = Some(now);
        row.tm_update = now;
        Ok(())
    }
}

/// Campaigncall rows held in a map.
#[derive(Default)]
pub struct InMemoryCampaigncallRepository {
    rows: RwLock<HashMap<Uuid, Campaigncall>>,
}

impl InMemoryCampaigncallRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find<P>(&self, pred: P) -> Option<Campaigncall>
    where
        P: Fn(&Campaigncall) -> bool,
    {
        self.rows.read().values().find(|c| pred(c)).cloned()
    }

    fn list<P>(&self, pred: P, limit: usize) -> Vec<Campaigncall>
    where
        P: Fn(&Campaigncall) -> bool,
    {
        let rows: Vec<_> = self
            .rows
            .read()
            .values()
            .filter(|c| pred(c))
            .cloned()
            .collect();
        newest_first(rows, |c| c.tm_create, limit)
    }

    fn modify<F>(&self, id: Uuid, f: F) -> Result<(), CampaignError>
    where
        F: FnOnce(&mut Campaigncall),
    {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| CampaignError::not_found("campaigncall", id))?;
        f(row);
        row.tm_update = now_ms();
        Ok(())
    }
}

#[async_trait]
impl CampaigncallRepository for InMemoryCampaigncallRepository {
    async fn campaigncall_create(&self, call: &Campaigncall) -> Result<(), CampaignError> {
        let mut rows = self.rows.write();
        if rows.contains_key(&call.id) {
            return Err(CampaignError::InvalidArgument(format!(
                "campaigncall {} already exists",
                call.id
            )));
        }
        rows.insert(call.id, call.clone());
        Ok(())
    }

    async fn campaigncall_get(&self, id: Uuid) -> Result<Campaigncall, CampaignError> {
        self.rows
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CampaignError::not_found("campaigncall", id))
    }

    async fn campaigncall_get_by_reference_id(
        &self,
        reference_id: Uuid,
    ) -> Result<Campaigncall, CampaignError> {
        self.find(|c| c.reference_id == Some(reference_id))
            .ok_or_else(|| CampaignError::not_found("campaigncall", reference_id))
    }

    async fn campaigncall_get_by_activeflow_id(
        &self,
        activeflow_id: Uuid,
    ) -> Result<Campaigncall, CampaignError> {
        self.find(|c| c.activeflow_id == activeflow_id)
            .ok_or_else(|| CampaignError::not_found("campaigncall", activeflow_id))
    }

    async fn campaigncall_list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        Ok(self.list(|c| c.customer_id == customer_id, limit))
    }

    async fn campaigncall_list_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        Ok(self.list(|c| c.campaign_id == campaign_id, limit))
    }

    async fn campaigncall_list_by_campaign_and_status(
        &self,
        campaign_id: Uuid,
        status: CampaigncallStatus,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        Ok(self.list(
            |c| c.campaign_id == campaign_id && c.status == status,
            limit,
        ))
    }

    async fn campaigncall_list_ongoing_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        Ok(self.list(|c| c.campaign_id == campaign_id && c.is_ongoing(), limit))
    }

    async fn campaigncall_update_status(
        &self,
        id: Uuid,
        status: CampaigncallStatus,
    ) -> Result<(), CampaignError> {
        self.modify(id, |row| row.status = status)
    }

    async fn campaigncall_update_status_and_result(
        &self,
        id: Uuid,
        status: CampaigncallStatus,
        result: CampaigncallResult,
    ) -> Result<(), CampaignError> {
        self.modify(id, |row| {
            row.status = status;
            row.result = result;
        })
    }
}
