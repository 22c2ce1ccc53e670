//! Outplan handler. Plain configuration; the engine reads it every tick.

use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use crate::core::notify::{publish, Notifier};
use crate::core::{CampaignError, OutplanRepository};
use crate::models::{
    Address, Outplan, EVENT_OUTPLAN_CREATED, EVENT_OUTPLAN_DELETED, EVENT_OUTPLAN_UPDATED,
    MAX_DESTINATION_SLOTS,
};
use crate::util::clock::now_ms;

/// Dial policy fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialInfo {
    /// Caller id.
    pub source: Option<Address>,
    /// Dial timeout in milliseconds.
    pub dial_timeout_ms: u64,
    /// Minimum time between attempts on one target.
    pub try_interval_ms: u64,
    /// Attempt cap per slot.
    pub max_try_counts: [u32; MAX_DESTINATION_SLOTS],
}

/// Fields of a new outplan.
#[derive(Debug, Clone)]
pub struct OutplanCreate {
    /// Owning customer.
    pub customer_id: Uuid,
    /// Name.
    pub name: String,
    /// Detail.
    pub detail: String,
    /// Policy.
    pub dial: DialInfo,
}

/// CRUD over outplans.
pub struct OutplanHandler {
    repo: Arc<dyn OutplanRepository>,
    notifier: Arc<dyn Notifier>,
}

impl OutplanHandler {
    /// Create a handler.
    pub fn new(repo: Arc<dyn OutplanRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// Create an outplan.
    pub async fn create(&self, req: OutplanCreate) -> Result<Outplan, CampaignError> {
        let now = now_ms();
        let outplan = Outplan {
            id: Uuid::new_v4(),
            customer_id: req.customer_id,
            name: req.name,
            detail: req.detail,
            source: req.dial.source,
            dial_timeout_ms: req.dial.dial_timeout_ms,
            try_interval_ms: req.dial.try_interval_ms,
            max_try_counts: req.dial.max_try_counts,
            tm_create: now,
            tm_update: now,
            tm_delete: None,
        };
        self.repo.outplan_create(&outplan).await.inspect_err(|e| {
            error!(customer_id = %outplan.customer_id, "could not create the outplan: {}", e);
        })?;

        let res = self.repo.outplan_get(outplan.id).await?;
        debug!(outplan_id = %res.id, "outplan created");
        publish(&*self.notifier, res.customer_id, EVENT_OUTPLAN_CREATED, &res);
        Ok(res)
    }

    /// Fetch an outplan.
    pub async fn get(&self, id: Uuid) -> Result<Outplan, CampaignError> {
        self.repo.outplan_get(id).await
    }

    /// Outplans of a customer.
    pub async fn list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Outplan>, CampaignError> {
        self.repo.outplan_list_by_customer(customer_id, limit).await
    }

    /// Change name and detail.
    pub async fn update_basic_info(
        &self,
        id: Uuid,
        name: String,
        detail: String,
    ) -> Result<Outplan, CampaignError> {
        let mut outplan = self.repo.outplan_get(id).await?;
        outplan.name = name;
        outplan.detail = detail;
        self.save(outplan).await
    }

    /// Change the dial policy. Takes effect on the next tick of every
    /// campaign using this outplan.
    pub async fn update_dial_info(&self, id: Uuid, dial: DialInfo) -> Result<Outplan, CampaignError> {
        let mut outplan = self.repo.outplan_get(id).await?;
        outplan.source = dial.source;
        outplan.dial_timeout_ms = dial.dial_timeout_ms;
        outplan.try_interval_ms = dial.try_interval_ms;
        outplan.max_try_counts = dial.max_try_counts;
        self.save(outplan).await
    }

    /// Soft delete.
    pub async fn delete(&self, id: Uuid) -> Result<Outplan, CampaignError> {
        self.repo.outplan_delete(id).await?;
        let res = self.repo.outplan_get(id).await?;
        publish(&*self.notifier, res.customer_id, EVENT_OUTPLAN_DELETED, &res);
        Ok(res)
    }

    async fn save(&self, mut outplan: Outplan) -> Result<Outplan, CampaignError> {
        outplan.tm_update = now_ms();
        self.repo.outplan_update(&outplan).await?;
        let res = self.repo.outplan_get(outplan.id).await?;
        publish(&*self.notifier, res.customer_id, EVENT_OUTPLAN_UPDATED, &res);
        Ok(res)
    }
}
