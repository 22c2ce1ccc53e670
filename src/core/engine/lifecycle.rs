//! Campaign CRUD and the run/stop status machine.

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::CampaignEngine;
use crate::core::notify::publish;
use crate::core::CampaignError;
use crate::models::{
    Action, Campaign, CampaignStatus, CampaignType, EndHandle, Execute, EVENT_CAMPAIGN_CREATED,
    EVENT_CAMPAIGN_DELETED, EVENT_CAMPAIGN_UPDATED,
};
use crate::util::clock::now_ms;

/// Fields of a new campaign.
#[derive(Debug, Clone)]
pub struct CampaignCreate {
    /// Preset id; a fresh one is generated when `None`.
    pub id: Option<Uuid>,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Dispatch kind.
    pub campaign_type: CampaignType,
    /// Name.
    pub name: String,
    /// Detail.
    pub detail: String,
    /// Flow actions.
    pub actions: Vec<Action>,
    /// Percentage of available agents dialing may occupy.
    pub service_level: u32,
    /// Behaviour on an exhausted list.
    pub end_handle: EndHandle,
    /// Dial policy.
    pub outplan_id: Option<Uuid>,
    /// Target list.
    pub outdial_id: Option<Uuid>,
    /// Throttling queue.
    pub queue_id: Option<Uuid>,
    /// Campaign to chain to.
    pub next_campaign_id: Option<Uuid>,
}

/// Descriptive fields.
#[derive(Debug, Clone)]
pub struct BasicInfo {
    /// Name.
    pub name: String,
    /// Detail.
    pub detail: String,
    /// Dispatch kind.
    pub campaign_type: CampaignType,
    /// Service level.
    pub service_level: u32,
    /// Behaviour on an exhausted list.
    pub end_handle: EndHandle,
}

/// Referenced resources.
#[derive(Debug, Clone, Copy)]
pub struct ResourceInfo {
    /// Dial policy.
    pub outplan_id: Option<Uuid>,
    /// Target list.
    pub outdial_id: Option<Uuid>,
    /// Throttling queue.
    pub queue_id: Option<Uuid>,
    /// Campaign to chain to.
    pub next_campaign_id: Option<Uuid>,
}

fn validate_service_level(service_level: u32) -> Result<(), CampaignError> {
    if service_level > 100 {
        return Err(CampaignError::InvalidArgument(format!(
            "service level must be within 0..=100, got {service_level}"
        )));
    }
    Ok(())
}

/// Campaign flow actions: the caller's actions, then a queue join when a
/// queue is set.
fn flow_actions(actions: &[Action], queue_id: Option<Uuid>) -> Vec<Action> {
    let mut res = actions.to_vec();
    if let Some(queue_id) = queue_id {
        res.push(Action::queue_join(queue_id));
    }
    res
}

impl CampaignEngine {
    /// Create a campaign in `stop`.
    pub async fn create(&self, req: CampaignCreate) -> Result<Campaign, CampaignError> {
        let id = req.id.unwrap_or_else(Uuid::new_v4);
        validate_service_level(req.service_level)?;
        let resources = ResourceInfo {
            outplan_id: req.outplan_id,
            outdial_id: req.outdial_id,
            queue_id: req.queue_id,
            next_campaign_id: req.next_campaign_id,
        };
        self.validate_resources(id, req.customer_id, &resources).await?;

        let flow = self
            .flows
            .flow_create(req.customer_id, flow_actions(&req.actions, req.queue_id))
            .await
            .inspect_err(|e| {
                error!(campaign_id = %id, "could not create the campaign flow: {}", e);
            })?;

        let now = now_ms();
        let campaign = Campaign {
            id,
            customer_id: req.customer_id,
            campaign_type: req.campaign_type,
            name: req.name,
            detail: req.detail,
            status: CampaignStatus::Stop,
            execute: Execute::Stop,
            service_level: req.service_level,
            end_handle: req.end_handle,
            flow_id: Some(flow.id),
            actions: req.actions,
            outplan_id: req.outplan_id,
            outdial_id: req.outdial_id,
            queue_id: req.queue_id,
            next_campaign_id: req.next_campaign_id,
            tm_create: now,
            tm_update: now,
            tm_delete: None,
        };
        self.campaigns.campaign_create(&campaign).await?;

        let res = self.campaigns.campaign_get(id).await?;
        info!(campaign_id = %id, customer_id = %res.customer_id, "campaign created");
        publish(&*self.notifier, res.customer_id, EVENT_CAMPAIGN_CREATED, &res);

        self.bind_outdial(&res).await?;
        Ok(res)
    }

    /// Fetch a campaign.
    pub async fn get(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        self.campaigns.campaign_get(id).await
    }

    /// Campaigns of a customer.
    pub async fn list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaign>, CampaignError> {
        self.campaigns.campaign_list_by_customer(customer_id, limit).await
    }

    /// Change the descriptive fields.
    pub async fn update_basic_info(
        &self,
        id: Uuid,
        info: BasicInfo,
    ) -> Result<Campaign, CampaignError> {
        validate_service_level(info.service_level)?;
        let mut campaign = self.campaigns.campaign_get(id).await?;
        campaign.name = info.name;
        campaign.detail = info.detail;
        campaign.campaign_type = info.campaign_type;
        campaign.service_level = info.service_level;
        campaign.end_handle = info.end_handle;
        self.save_info(campaign).await
    }

    /// Change the referenced resources and rebuild the flow actions.
    ///
    /// A running campaign cannot lose its outplan or outdial. A replaced
    /// outdial is released for other campaigns.
    pub async fn update_resource_info(
        &self,
        id: Uuid,
        info: ResourceInfo,
    ) -> Result<Campaign, CampaignError> {
        let mut campaign = self.campaigns.campaign_get(id).await?;
        if campaign.status != CampaignStatus::Stop
            && (info.outplan_id.is_none() || info.outdial_id.is_none())
        {
            return Err(CampaignError::InvalidArgument(
                "a running campaign needs an outplan and an outdial".into(),
            ));
        }
        self.validate_resources(id, campaign.customer_id, &info).await?;

        let previous = campaign.outdial_id;
        campaign.outplan_id = info.outplan_id;
        campaign.outdial_id = info.outdial_id;
        campaign.queue_id = info.queue_id;
        campaign.next_campaign_id = info.next_campaign_id;
        self.rebuild_flow(&campaign).await?;
        let res = self.save_info(campaign).await?;

        self.bind_outdial(&res).await?;
        if let Some(previous) = previous.filter(|p| Some(*p) != res.outdial_id) {
            self.release_outdial(id, previous).await;
        }
        Ok(res)
    }

    /// Change the service level.
    pub async fn update_service_level(
        &self,
        id: Uuid,
        service_level: u32,
    ) -> Result<Campaign, CampaignError> {
        validate_service_level(service_level)?;
        let mut campaign = self.campaigns.campaign_get(id).await?;
        campaign.service_level = service_level;
        self.save_info(campaign).await
    }

    /// Replace the flow actions.
    pub async fn update_actions(
        &self,
        id: Uuid,
        actions: Vec<Action>,
    ) -> Result<Campaign, CampaignError> {
        let mut campaign = self.campaigns.campaign_get(id).await?;
        campaign.actions = actions;
        self.rebuild_flow(&campaign).await?;
        self.save_info(campaign).await
    }

    /// Change the chained campaign.
    pub async fn update_next_campaign_id(
        &self,
        id: Uuid,
        next_campaign_id: Option<Uuid>,
    ) -> Result<Campaign, CampaignError> {
        let mut campaign = self.campaigns.campaign_get(id).await?;
        if let Some(next) = next_campaign_id {
            self.validate_next_campaign(id, campaign.customer_id, next)
                .await?;
        }
        campaign.next_campaign_id = next_campaign_id;
        self.save_info(campaign).await
    }

    /// Soft delete a stopped campaign.
    pub async fn delete(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        let campaign = self.campaigns.campaign_get(id).await?;
        if campaign.status != CampaignStatus::Stop {
            return Err(CampaignError::InvalidTransition {
                from: campaign.status.to_string(),
                to: "deleted".into(),
            });
        }

        self.campaigns.campaign_delete(id).await?;
        if let Some(flow_id) = campaign.flow_id {
            if let Err(e) = self.flows.flow_delete(flow_id).await {
                warn!(campaign_id = %id, %flow_id, "could not delete the campaign flow: {}", e);
            }
        }
        if let Some(outdial_id) = campaign.outdial_id {
            self.release_outdial(id, outdial_id).await;
        }

        let res = self.campaigns.campaign_get(id).await?;
        info!(campaign_id = %id, "campaign deleted");
        publish(&*self.notifier, res.customer_id, EVENT_CAMPAIGN_DELETED, &res);
        Ok(res)
    }

    /// Request `run` or `stop`.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
    ) -> Result<Campaign, CampaignError> {
        match status {
            CampaignStatus::Run => self.campaign_run(id).await,
            CampaignStatus::Stop => self.campaign_stop(id).await,
            other => Err(CampaignError::InvalidArgument(format!(
                "status {other} cannot be requested"
            ))),
        }
    }

    async fn campaign_run(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        let campaign = self.campaigns.campaign_get(id).await?;
        if campaign.is_deleted() {
            return Err(CampaignError::not_found("campaign", id));
        }
        match campaign.status {
            CampaignStatus::Stop => {}
            CampaignStatus::Run if campaign.execute == Execute::Run => {
                debug!(campaign_id = %id, "campaign is already running");
                return Ok(campaign);
            }
            CampaignStatus::Run => {}
            from @ (CampaignStatus::Stopping | CampaignStatus::Running) => {
                return Err(CampaignError::InvalidTransition {
                    from: from.to_string(),
                    to: CampaignStatus::Run.to_string(),
                });
            }
        }
        if !campaign.has_dial_resources() {
            return Err(CampaignError::InvalidArgument(
                "campaign needs an outplan and an outdial to run".into(),
            ));
        }

        self.campaigns
            .campaign_update_status(id, CampaignStatus::Run)
            .await?;
        let mut res = self.campaigns.campaign_get(id).await?;
        info!(campaign_id = %id, "campaign is running");
        publish(&*self.notifier, res.customer_id, EVENT_CAMPAIGN_UPDATED, &res);

        if res.execute != Execute::Run {
            self.campaigns
                .campaign_update_execute(id, Execute::Run)
                .await?;
            if let Err(e) = self
                .scheduler
                .schedule_execute(id, self.config.run_delay_ms)
                .await
            {
                error!(campaign_id = %id, "could not schedule the first tick: {}", e);
                if let Err(stop_err) = self.update_execute_stop(id).await {
                    error!(campaign_id = %id, "could not stop the campaign: {}", stop_err);
                }
                return Err(e);
            }
            res = self.campaigns.campaign_get(id).await?;
        }
        Ok(res)
    }

    /// Stop a campaign, or move it to `stopping` while campaigncalls are
    /// still ongoing.
    pub async fn campaign_stop(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        let campaign = self.campaigns.campaign_get(id).await?;
        if campaign.status == CampaignStatus::Stop {
            return Ok(campaign);
        }

        let ongoing = self
            .campaigncalls
            .list_ongoing_by_campaign(id, self.config.ongoing_scan_limit)
            .await?;
        let next = if ongoing.is_empty() {
            CampaignStatus::Stop
        } else {
            CampaignStatus::Stopping
        };
        if next == campaign.status {
            return Ok(campaign);
        }

        self.campaigns.campaign_update_status(id, next).await?;
        let res = self.campaigns.campaign_get(id).await?;
        info!(campaign_id = %id, from = %campaign.status, to = %next, ongoing = ongoing.len(), "campaign stop requested");
        publish(&*self.notifier, res.customer_id, EVENT_CAMPAIGN_UPDATED, &res);
        Ok(res)
    }

    /// Clear the execute flag, then stop the campaign.
    pub async fn update_execute_stop(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        self.campaigns
            .campaign_update_execute(id, Execute::Stop)
            .await?;
        self.campaign_stop(id).await
    }

    /// Every referenced resource must exist, belong to the customer and not
    /// be deleted. The outdial must also be free or already ours.
    async fn validate_resources(
        &self,
        id: Uuid,
        customer_id: Uuid,
        info: &ResourceInfo,
    ) -> Result<(), CampaignError> {
        if let Some(outplan_id) = info.outplan_id {
            let outplan = self.outplans.get(outplan_id).await?;
            if outplan.is_deleted() || outplan.customer_id != customer_id {
                return Err(CampaignError::InvalidArgument(format!(
                    "outplan {outplan_id} is not usable by customer {customer_id}"
                )));
            }
        }
        if let Some(outdial_id) = info.outdial_id {
            let outdial = self.outdials.outdial_get(outdial_id).await?;
            if outdial.is_deleted() || outdial.customer_id != customer_id {
                return Err(CampaignError::InvalidArgument(format!(
                    "outdial {outdial_id} is not usable by customer {customer_id}"
                )));
            }
            if let Some(held) = outdial.campaign_id.filter(|held| *held != id) {
                return Err(CampaignError::InvalidArgument(format!(
                    "outdial {outdial_id} is used by campaign {held}"
                )));
            }
        }
        if let Some(queue_id) = info.queue_id {
            let queue = self.queues.queue_get(queue_id).await?;
            if queue.is_deleted() || queue.customer_id != customer_id {
                return Err(CampaignError::InvalidArgument(format!(
                    "queue {queue_id} is not usable by customer {customer_id}"
                )));
            }
        }
        if let Some(next) = info.next_campaign_id {
            self.validate_next_campaign(id, customer_id, next).await?;
        }
        Ok(())
    }

    async fn bind_outdial(&self, campaign: &Campaign) -> Result<(), CampaignError> {
        let Some(outdial_id) = campaign.outdial_id else {
            return Ok(());
        };
        self.outdials
            .outdial_update_campaign_id(outdial_id, Some(campaign.id))
            .await
            .inspect_err(|e| {
                error!(campaign_id = %campaign.id, %outdial_id, "could not bind the outdial: {}", e);
            })?;
        Ok(())
    }

    async fn release_outdial(&self, id: Uuid, outdial_id: Uuid) {
        match self.outdials.outdial_get(outdial_id).await {
            Ok(outdial) if outdial.campaign_id == Some(id) => {
                if let Err(e) = self
                    .outdials
                    .outdial_update_campaign_id(outdial_id, None)
                    .await
                {
                    warn!(campaign_id = %id, %outdial_id, "could not release the outdial: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(campaign_id = %id, %outdial_id, "could not read the released outdial: {}", e);
            }
        }
    }

    async fn validate_next_campaign(
        &self,
        id: Uuid,
        customer_id: Uuid,
        next: Uuid,
    ) -> Result<(), CampaignError> {
        if next == id {
            return Err(CampaignError::InvalidArgument(
                "a campaign cannot chain to itself".into(),
            ));
        }
        let next_campaign = self.campaigns.campaign_get(next).await?;
        if next_campaign.is_deleted() || next_campaign.customer_id != customer_id {
            return Err(CampaignError::InvalidArgument(format!(
                "next campaign {next} is not usable by customer {customer_id}"
            )));
        }
        Ok(())
    }

    async fn rebuild_flow(&self, campaign: &Campaign) -> Result<(), CampaignError> {
        let Some(flow_id) = campaign.flow_id else {
            return Ok(());
        };
        self.flows
            .flow_update_actions(flow_id, flow_actions(&campaign.actions, campaign.queue_id))
            .await?;
        Ok(())
    }

    async fn save_info(&self, mut campaign: Campaign) -> Result<Campaign, CampaignError> {
        campaign.tm_update = now_ms();
        self.campaigns.campaign_update_info(&campaign).await?;
        let res = self.campaigns.campaign_get(campaign.id).await?;
        publish(&*self.notifier, res.customer_id, EVENT_CAMPAIGN_UPDATED, &res);
        Ok(res)
    }
}
