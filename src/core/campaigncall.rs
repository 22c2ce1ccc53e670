//! Campaigncall tracker: attempt rows, their status transitions, and the
//! mapping from call/flow outcomes back onto outdial target state.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::notify::{publish, Notifier};
use crate::core::{CampaignError, CampaigncallRepository, OutdialTargetStore};
use crate::models::{
    Address, Call, Campaigncall, CampaigncallResult, CampaigncallStatus, HangupReason,
    OutdialTargetStatus, ReferenceType, EVENT_CAMPAIGNCALL_CREATED, EVENT_CAMPAIGNCALL_UPDATED,
};
use crate::util::clock::now_ms;

/// Fields of a new campaigncall. Status starts at dialing, result at none.
#[derive(Debug, Clone)]
pub struct CampaigncallCreate {
    /// Owning customer.
    pub customer_id: Uuid,
    /// Dispatching campaign.
    pub campaign_id: Uuid,
    /// Dial policy.
    pub outplan_id: Uuid,
    /// Target list.
    pub outdial_id: Uuid,
    /// Dialed target.
    pub outdial_target_id: Uuid,
    /// Throttling queue.
    pub queue_id: Option<Uuid>,
    /// Activeflow bound to the attempt.
    pub activeflow_id: Uuid,
    /// Campaign flow.
    pub flow_id: Option<Uuid>,
    /// Kind of `reference_id`.
    pub reference_type: ReferenceType,
    /// Call id for call campaigns.
    pub reference_id: Option<Uuid>,
    /// Caller id.
    pub source: Option<Address>,
    /// Dialed destination.
    pub destination: Address,
    /// Slot index.
    pub destination_index: usize,
    /// Attempt number on that slot.
    pub try_count: u32,
}

/// Result for a hangup reason. Total over the eight known reasons; anything
/// else is rejected.
pub fn result_for_hangup(reason: HangupReason) -> Result<CampaigncallResult, CampaignError> {
    match reason {
        HangupReason::Normal => Ok(CampaigncallResult::Success),
        HangupReason::Failed
        | HangupReason::Busy
        | HangupReason::Canceled
        | HangupReason::Timeout
        | HangupReason::Noanswer
        | HangupReason::Dialout
        | HangupReason::Amd => Ok(CampaigncallResult::Fail),
        HangupReason::None | HangupReason::Unknown => {
            Err(CampaignError::UnknownHangupReason(format!("{reason:?}")))
        }
    }
}

/// Target status implied by an attempt result: failures go back to idle so
/// the remaining slots and tries stay usable, anything else finishes it.
#[must_use]
pub const fn target_status_for_result(result: CampaigncallResult) -> OutdialTargetStatus {
    match result {
        CampaigncallResult::Fail => OutdialTargetStatus::Idle,
        CampaigncallResult::Success | CampaigncallResult::None => OutdialTargetStatus::Done,
    }
}

/// Tracks dispatched attempts.
pub struct CampaigncallTracker {
    repo: Arc<dyn CampaigncallRepository>,
    targets: Arc<dyn OutdialTargetStore>,
    notifier: Arc<dyn Notifier>,
}

impl CampaigncallTracker {
    /// Create a tracker.
    pub fn new(
        repo: Arc<dyn CampaigncallRepository>,
        targets: Arc<dyn OutdialTargetStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            targets,
            notifier,
        }
    }

    /// Insert a dialing campaigncall and publish `campaigncall_created`.
    pub async fn create(&self, req: CampaigncallCreate) -> Result<Campaigncall, CampaignError> {
        let now = now_ms();
        let call = Campaigncall {
            id: Uuid::new_v4(),
            customer_id: req.customer_id,
            campaign_id: req.campaign_id,
            outplan_id: req.outplan_id,
            outdial_id: req.outdial_id,
            outdial_target_id: req.outdial_target_id,
            queue_id: req.queue_id,
            activeflow_id: req.activeflow_id,
            flow_id: req.flow_id,
            reference_type: req.reference_type,
            reference_id: req.reference_id,
            status: CampaigncallStatus::Dialing,
            source: req.source,
            destination: req.destination,
            destination_index: req.destination_index,
            try_count: req.try_count,
            result: CampaigncallResult::None,
            tm_create: now,
            tm_update: now,
        };
        self.repo.campaigncall_create(&call).await?;

        let res = self.repo.campaigncall_get(call.id).await?;
        debug!(campaigncall_id = %res.id, campaign_id = %res.campaign_id, "campaigncall created");
        publish(&*self.notifier, res.customer_id, EVENT_CAMPAIGNCALL_CREATED, &res);
        Ok(res)
    }

    /// Fetch by id.
    pub async fn get(&self, id: Uuid) -> Result<Campaigncall, CampaignError> {
        self.repo.campaigncall_get(id).await
    }

    /// Fetch by referenced call id.
    pub async fn get_by_reference_id(&self, reference_id: Uuid) -> Result<Campaigncall, CampaignError> {
        self.repo.campaigncall_get_by_reference_id(reference_id).await
    }

    /// Fetch by activeflow id.
    pub async fn get_by_activeflow_id(
        &self,
        activeflow_id: Uuid,
    ) -> Result<Campaigncall, CampaignError> {
        self.repo.campaigncall_get_by_activeflow_id(activeflow_id).await
    }

    /// Campaigncalls of a customer.
    pub async fn list_by_customer(
        &self,
        customer_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        self.repo.campaigncall_list_by_customer(customer_id, limit).await
    }

    /// Campaigncalls of a campaign.
    pub async fn list_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        self.repo.campaigncall_list_by_campaign(campaign_id, limit).await
    }

    /// Campaigncalls of a campaign in one status.
    pub async fn list_by_campaign_and_status(
        &self,
        campaign_id: Uuid,
        status: CampaigncallStatus,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        self.repo
            .campaigncall_list_by_campaign_and_status(campaign_id, status, limit)
            .await
    }

    /// Dialing or progressing campaigncalls of a campaign.
    pub async fn list_ongoing_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Campaigncall>, CampaignError> {
        self.repo
            .campaigncall_list_ongoing_by_campaign(campaign_id, limit)
            .await
    }

    /// Generic status update; publishes `campaigncall_updated`.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: CampaigncallStatus,
    ) -> Result<Campaigncall, CampaignError> {
        self.repo.campaigncall_update_status(id, status).await?;
        let res = self.repo.campaigncall_get(id).await?;
        publish(&*self.notifier, res.customer_id, EVENT_CAMPAIGNCALL_UPDATED, &res);
        Ok(res)
    }

    /// Move a flow attempt to progressing.
    pub async fn progressing(&self, id: Uuid) -> Result<Campaigncall, CampaignError> {
        self.repo
            .campaigncall_update_status(id, CampaigncallStatus::Progressing)
            .await?;
        self.repo.campaigncall_get(id).await
    }

    /// Finish an attempt and push the implied status onto its target.
    pub async fn done(
        &self,
        id: Uuid,
        result: CampaigncallResult,
    ) -> Result<Campaigncall, CampaignError> {
        self.repo
            .campaigncall_update_status_and_result(id, CampaigncallStatus::Done, result)
            .await?;
        let res = self.repo.campaigncall_get(id).await?;
        info!(campaigncall_id = %id, ?result, "campaigncall done");
        publish(&*self.notifier, res.customer_id, EVENT_CAMPAIGNCALL_UPDATED, &res);

        let target_status = target_status_for_result(result);
        if let Err(e) = self
            .targets
            .update_status(res.outdial_target_id, target_status)
            .await
        {
            error!(
                campaigncall_id = %id,
                target_id = %res.outdial_target_id,
                "could not update the outdial target status: {}", e
            );
            return Err(e);
        }
        Ok(res)
    }

    /// Apply a hangup of the call referenced by `campaigncall`.
    ///
    /// Unknown reasons are rejected before anything is written.
    pub async fn event_handle_reference_call_hungup(
        &self,
        call: &Call,
        campaigncall: &Campaigncall,
    ) -> Result<Campaigncall, CampaignError> {
        let result = result_for_hangup(call.hangup_reason).inspect_err(|e| {
            warn!(call_id = %call.id, campaigncall_id = %campaigncall.id, "rejecting hangup: {}", e);
        })?;
        if campaigncall.status == CampaigncallStatus::Done {
            debug!(campaigncall_id = %campaigncall.id, "campaigncall already done");
            return Ok(campaigncall.clone());
        }
        self.done(campaigncall.id, result).await
    }

    /// Apply the deletion of the activeflow bound to `campaigncall`. Flow
    /// completion always counts as success.
    pub async fn event_handle_activeflow_deleted(
        &self,
        campaigncall: &Campaigncall,
    ) -> Result<Campaigncall, CampaignError> {
        if campaigncall.status == CampaigncallStatus::Done {
            debug!(campaigncall_id = %campaigncall.id, "campaigncall already done");
            return Ok(campaigncall.clone());
        }
        self.done(campaigncall.id, CampaigncallResult::Success).await
    }
}
