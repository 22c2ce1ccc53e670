//! Persistence ports for the rows this engine owns.
//!
//! Every write is a single-row operation. Field-level updates exist so that
//! the engine's status flips never overwrite a concurrent info edit.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::CampaignError;
use crate::models::{
    Campaign, CampaignStatus, Campaigncall, CampaigncallResult, CampaigncallStatus, Execute,
    Outplan,
};

/// Campaign rows.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Insert a new campaign.
    async fn campaign_create(&self, campaign: &Campaign) -> Result<(), CampaignError>;
    /// Fetch a campaign, deleted rows included.
    async fn campaign_get(&self, id: Uuid) -> Result<Campaign, CampaignError>;
    /// Non-deleted campaigns of a customer, newest first.
    async fn campaign_list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaign>, CampaignError>;
    /// Overwrite the editable info fields (name through next campaign).
    async fn campaign_update_info(&self, campaign: &Campaign) -> Result<(), CampaignError>;
    /// Set the status.
    async fn campaign_update_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
    ) -> Result<(), CampaignError>;
    /// Set the execute flag.
    async fn campaign_update_execute(&self, id: Uuid, execute: Execute)
        -> Result<(), CampaignError>;
    /// Soft delete.
    async fn campaign_delete(&self, id: Uuid) -> Result<(), CampaignError>;
}

/// Outplan rows.
#[async_trait]
pub trait OutplanRepository: Send + Sync {
    /// Insert a new outplan.
    async fn outplan_create(&self, outplan: &Outplan) -> Result<(), CampaignError>;
    /// Fetch an outplan, deleted rows included.
    async fn outplan_get(&self, id: Uuid) -> Result<Outplan, CampaignError>;
    /// Non-deleted outplans of a customer, newest first.
    async fn outplan_list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Outplan>, CampaignError>;
    /// Overwrite every non-key field.
    async fn outplan_update(&self, outplan: &Outplan) -> Result<(), CampaignError>;
    /// Soft delete.
    async fn outplan_delete(&self, id: Uuid) -> Result<(), CampaignError>;
}

/// Campaigncall rows.
#[async_trait]
pub trait CampaigncallRepository: Send + Sync {
    /// Insert a new campaigncall.
    async fn campaigncall_create(&self, call: &Campaigncall) -> Result<(), CampaignError>;
    /// Fetch by id.
    async fn campaigncall_get(&self, id: Uuid) -> Result<Campaigncall, CampaignError>;
    /// Fetch by the call id it references.
    async fn campaigncall_get_by_reference_id(
        &self,
        reference_id: Uuid,
    ) -> Result<Campaigncall, CampaignError>;
    /// Fetch by activeflow id.
    async fn campaigncall_get_by_activeflow_id(
        &self,
        activeflow_id: Uuid,
    ) -> Result<Campaigncall, CampaignError>;
    /// Campaigncalls of a customer, newest first.
    async fn campaigncall_list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError>;
    /// Campaigncalls of a campaign, newest first.
    async fn campaigncall_list_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError>;
    /// Campaigncalls of a campaign in one status, newest first.
    async fn campaigncall_list_by_campaign_and_status(
        &self,
        campaign_id: Uuid,
        status: CampaigncallStatus,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError>;
    /// Dialing or progressing campaigncalls of a campaign, newest first.
    async fn campaigncall_list_ongoing_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError>;
    /// Set the status.
    async fn campaigncall_update_status(
        &self,
        id: Uuid,
        status: CampaigncallStatus,
    ) -> Result<(), CampaignError>;
    /// Set status and result together.
    async fn campaigncall_update_status_and_result(
        &self,
        id: Uuid,
        status: CampaigncallStatus,
        result: CampaigncallResult,
    ) -> Result<(), CampaignError>;
}
