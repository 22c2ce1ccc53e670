//! One engine tick.

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::CampaignEngine;
use crate::core::admission;
use crate::core::campaigncall::CampaigncallCreate;
use crate::core::outdial::{select_destination, SelectedDestination};
use crate::core::{CallCreateRequest, CampaignError};
use crate::models::{
    ActiveflowReferenceType, AgentStatus, Campaign, CampaignStatus, CampaignType, Campaigncall,
    CampaigncallResult, CampaigncallStatus, EndHandle, OutdialTarget,
    Outplan, ReferenceType,
};

/// Why a tick backed off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffReason {
    /// Dialing count already fills the agent capacity.
    NoCapacity,
    /// No eligible target right now and the campaign keeps polling.
    NoTarget,
}

/// Why a tick halted the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// Campaign could not be loaded.
    CampaignUnavailable,
    /// Campaign status is not `run`.
    NotRunning,
    /// Agent or dialing count could not be read.
    AdmissionFailed,
    /// Outplan missing, deleted or unreadable.
    OutplanUnavailable,
    /// Target store query failed.
    TargetQueryFailed,
    /// Outdial list exhausted and the campaign ends on exhaustion.
    Exhausted,
    /// Store returned a target without an eligible slot.
    NoEligibleSlot,
    /// Campaigncall creation or the call/flow request failed.
    DispatchFailed,
    /// The next tick could not be scheduled.
    ScheduleFailed,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One attempt dispatched; next tick at the dispatch delay.
    Dispatched {
        /// Created campaigncall.
        campaigncall_id: Uuid,
    },
    /// Nothing dispatched; next tick at the backoff delay.
    Backoff(BackoffReason),
    /// Another dispatcher claimed the slot first; next tick at the dispatch delay.
    Contended,
    /// Campaign halted; no next tick.
    Halted(HaltReason),
    /// A tick for this campaign was already running here; dropped.
    Skipped,
}

impl CampaignEngine {
    /// Run one tick for `campaign_id`.
    ///
    /// Never fails: every error ends in either a rescheduled tick or a
    /// best-effort stop of the campaign, reported through the outcome.
    pub async fn execute(&self, campaign_id: Uuid) -> TickOutcome {
        let Some(_guard) = self.enter_tick(campaign_id) else {
            debug!(%campaign_id, "tick already in flight, dropping duplicate");
            return TickOutcome::Skipped;
        };
        let outcome = self.tick(campaign_id).await;
        debug!(%campaign_id, ?outcome, "tick finished");
        outcome
    }

    async fn tick(&self, campaign_id: Uuid) -> TickOutcome {
        let campaign = match self.campaigns.campaign_get(campaign_id).await {
            Ok(c) => c,
            Err(e) => {
                error!(%campaign_id, "could not get the campaign, stopping the execution: {}", e);
                return self.halt(campaign_id, HaltReason::CampaignUnavailable).await;
            }
        };

        if campaign.status != CampaignStatus::Run {
            info!(%campaign_id, status = %campaign.status, "campaign is not running, stopping the execution");
            return self.halt(campaign_id, HaltReason::NotRunning).await;
        }

        match self.is_dialable(&campaign).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(%campaign_id, "campaign is not dialable now");
                return self
                    .reschedule(
                        campaign_id,
                        self.config.backoff_delay_ms,
                        TickOutcome::Backoff(BackoffReason::NoCapacity),
                    )
                    .await;
            }
            Err(e) => {
                error!(%campaign_id, "could not check the campaign capacity: {}", e);
                return self.halt(campaign_id, HaltReason::AdmissionFailed).await;
            }
        }

        let outplan = match self.load_outplan(&campaign).await {
            Ok(p) => p,
            Err(e) => {
                error!(%campaign_id, "could not get the outplan, stopping the execution: {}", e);
                return self.halt(campaign_id, HaltReason::OutplanUnavailable).await;
            }
        };

        let target = match self.get_target(&campaign, &outplan).await {
            Ok(Some(t)) => t,
            Ok(None) if campaign.end_handle == EndHandle::Stop => {
                info!(%campaign_id, "no outdial target left, stopping the campaign");
                return self.halt(campaign_id, HaltReason::Exhausted).await;
            }
            Ok(None) => {
                debug!(%campaign_id, "no outdial target available now, polling again later");
                return self
                    .reschedule(
                        campaign_id,
                        self.config.backoff_delay_ms,
                        TickOutcome::Backoff(BackoffReason::NoTarget),
                    )
                    .await;
            }
            Err(e) => {
                error!(%campaign_id, "could not get an outdial target, stopping the campaign: {}", e);
                return self.halt(campaign_id, HaltReason::TargetQueryFailed).await;
            }
        };

        let Some(selected) = select_destination(&target, &outplan.max_try_counts) else {
            error!(
                %campaign_id,
                target_id = %target.id,
                "store returned a target without a dialable slot, stopping the campaign"
            );
            return self.halt(campaign_id, HaltReason::NoEligibleSlot).await;
        };

        let dispatched = match campaign.campaign_type {
            CampaignType::Call => self.execute_call(&campaign, &outplan, &target, selected).await,
            CampaignType::Flow => self.execute_flow(&campaign, &outplan, &target, selected).await,
        };
        match dispatched {
            Ok(cc) => {
                debug!(%campaign_id, campaigncall_id = %cc.id, "dispatched a campaigncall");
                self.reschedule(
                    campaign_id,
                    self.config.dispatch_delay_ms,
                    TickOutcome::Dispatched {
                        campaigncall_id: cc.id,
                    },
                )
                .await
            }
            Err(e) if e.is_contention() => {
                warn!(%campaign_id, "lost the slot to another dispatcher: {}", e);
                self.reschedule(campaign_id, self.config.dispatch_delay_ms, TickOutcome::Contended)
                    .await
            }
            Err(e) => {
                error!(%campaign_id, "could not dispatch, stopping the campaign: {}", e);
                self.halt(campaign_id, HaltReason::DispatchFailed).await
            }
        }
    }

    /// Admission check. Campaigns without a queue are never throttled.
    async fn is_dialable(&self, campaign: &Campaign) -> Result<bool, CampaignError> {
        let Some(queue_id) = campaign.queue_id else {
            return Ok(true);
        };

        let agents = self
            .queues
            .get_agents(queue_id, AgentStatus::Available)
            .await?;
        let dialing = self
            .campaigncalls
            .list_by_campaign_and_status(
                campaign.id,
                CampaigncallStatus::Dialing,
                self.config.dialing_scan_limit,
            )
            .await?
            .len();

        let dialable = admission::is_dialable(agents.len(), campaign.service_level, dialing);
        debug!(
            campaign_id = %campaign.id,
            agents = agents.len(),
            service_level = campaign.service_level,
            dialing,
            dialable,
            "admission check"
        );
        Ok(dialable)
    }

    async fn load_outplan(&self, campaign: &Campaign) -> Result<Outplan, CampaignError> {
        let outplan_id = campaign
            .outplan_id
            .ok_or_else(|| CampaignError::InvalidArgument("campaign has no outplan".into()))?;
        let outplan = self.outplans.get(outplan_id).await?;
        if outplan.is_deleted() {
            return Err(CampaignError::not_found("outplan", outplan_id));
        }
        Ok(outplan)
    }

    async fn get_target(
        &self,
        campaign: &Campaign,
        outplan: &Outplan,
    ) -> Result<Option<OutdialTarget>, CampaignError> {
        let outdial_id = campaign
            .outdial_id
            .ok_or_else(|| CampaignError::InvalidArgument("campaign has no outdial".into()))?;
        let targets = self
            .targets
            .get_available(outdial_id, outplan.max_try_counts, outplan.try_interval_ms, 1)
            .await?;
        Ok(targets.into_iter().next())
    }

    /// Claim the slot, then record the attempt. A failed record undoes the
    /// claim so the slot keeps its attempt.
    async fn claim_and_create(
        &self,
        campaign: &Campaign,
        outplan: &Outplan,
        target: &OutdialTarget,
        selected: SelectedDestination,
        activeflow_id: Uuid,
        reference_type: ReferenceType,
        reference_id: Option<Uuid>,
    ) -> Result<Campaigncall, CampaignError> {
        self.targets
            .update_progressing(target.id, selected.index, selected.try_count - 1)
            .await?;

        let req = CampaigncallCreate {
            customer_id: campaign.customer_id,
            campaign_id: campaign.id,
            outplan_id: outplan.id,
            outdial_id: target.outdial_id,
            outdial_target_id: target.id,
            queue_id: campaign.queue_id,
            activeflow_id,
            flow_id: campaign.flow_id,
            reference_type,
            reference_id,
            source: outplan.source.clone(),
            destination: selected.destination,
            destination_index: selected.index,
            try_count: selected.try_count,
        };
        match self.campaigncalls.create(req).await {
            Ok(cc) => Ok(cc),
            Err(e) => {
                if let Err(release) = self
                    .targets
                    .release_claim(target.id, selected.index, selected.try_count)
                    .await
                {
                    error!(target_id = %target.id, "could not release the target: {}", release);
                }
                Err(e)
            }
        }
    }

    async fn execute_call(
        &self,
        campaign: &Campaign,
        outplan: &Outplan,
        target: &OutdialTarget,
        selected: SelectedDestination,
    ) -> Result<Campaigncall, CampaignError> {
        let call_id = Uuid::new_v4();
        let activeflow_id = Uuid::new_v4();

        let cc = self
            .claim_and_create(
                campaign,
                outplan,
                target,
                selected,
                activeflow_id,
                ReferenceType::Call,
                Some(call_id),
            )
            .await?;

        let req = CallCreateRequest {
            call_id,
            customer_id: campaign.customer_id,
            flow_id: campaign.flow_id,
            activeflow_id,
            master_call_id: None,
            source: cc.source.clone(),
            destination: cc.destination.clone(),
        };
        match self.calls.create_call_with_id(req).await {
            Ok(call) => {
                debug!(campaigncall_id = %cc.id, call_id = %call.id, "created a call");
                Ok(cc)
            }
            Err(e) => {
                self.fail_campaigncall(cc.id).await;
                Err(e)
            }
        }
    }

    async fn execute_flow(
        &self,
        campaign: &Campaign,
        outplan: &Outplan,
        target: &OutdialTarget,
        selected: SelectedDestination,
    ) -> Result<Campaigncall, CampaignError> {
        let flow_id = campaign
            .flow_id
            .ok_or_else(|| CampaignError::InvalidArgument("flow campaign has no flow".into()))?;
        let activeflow_id = Uuid::new_v4();

        let created = self
            .claim_and_create(
                campaign,
                outplan,
                target,
                selected,
                activeflow_id,
                ReferenceType::Flow,
                None,
            )
            .await?;

        let cc = match self.campaigncalls.progressing(created.id).await {
            Ok(cc) => cc,
            Err(e) => {
                self.fail_campaigncall(created.id).await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .flows
            .activeflow_create(activeflow_id, flow_id, ActiveflowReferenceType::None, None)
            .await
        {
            self.fail_campaigncall(cc.id).await;
            return Err(e);
        }
        if let Err(e) = self.flows.activeflow_execute(activeflow_id).await {
            self.fail_campaigncall(cc.id).await;
            return Err(e);
        }
        Ok(cc)
    }

    async fn fail_campaigncall(&self, campaigncall_id: Uuid) {
        if let Err(e) = self
            .campaigncalls
            .done(campaigncall_id, CampaigncallResult::Fail)
            .await
        {
            error!(%campaigncall_id, "could not fail the campaigncall: {}", e);
        }
    }

    async fn reschedule(&self, campaign_id: Uuid, delay_ms: u64, outcome: TickOutcome) -> TickOutcome {
        if let Err(e) = self.scheduler.schedule_execute(campaign_id, delay_ms).await {
            error!(%campaign_id, "could not schedule the next tick, stopping the campaign: {}", e);
            return self.halt(campaign_id, HaltReason::ScheduleFailed).await;
        }
        outcome
    }

    async fn halt(&self, campaign_id: Uuid, reason: HaltReason) -> TickOutcome {
        if let Err(e) = self.update_execute_stop(campaign_id).await {
            error!(%campaign_id, "could not stop the campaign execute: {}", e);
        }
        TickOutcome::Halted(reason)
    }
}
