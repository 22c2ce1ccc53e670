//! Outcome events from the call and flow services.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::CampaignEngine;
use crate::core::CampaignError;
use crate::models::{Activeflow, Call, CampaignStatus, Campaigncall};

/// Event consumed from a collaborator service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A call ended.
    CallHungup {
        /// The call, carrying its hangup reason.
        call: Call,
    },
    /// An activeflow finished and was removed.
    ActiveflowDeleted {
        /// The removed activeflow.
        activeflow: Activeflow,
    },
}

impl CampaignEngine {
    /// Dispatch an inbound event. Returns the affected campaigncall, or
    /// `None` when the event belongs to no campaigncall.
    pub async fn handle_event(
        &self,
        event: &InboundEvent,
    ) -> Result<Option<Campaigncall>, CampaignError> {
        match event {
            InboundEvent::CallHungup { call } => self.event_call_hungup(call).await,
            InboundEvent::ActiveflowDeleted { activeflow } => {
                self.event_activeflow_deleted(activeflow).await
            }
        }
    }

    /// Apply a call hangup.
    pub async fn event_call_hungup(
        &self,
        call: &Call,
    ) -> Result<Option<Campaigncall>, CampaignError> {
        let campaigncall = match self.campaigncalls.get_by_reference_id(call.id).await {
            Ok(cc) => cc,
            Err(CampaignError::NotFound { .. }) => {
                debug!(call_id = %call.id, "call is not owned by any campaigncall");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let res = self
            .campaigncalls
            .event_handle_reference_call_hungup(call, &campaigncall)
            .await?;
        self.settle_stopping(res.campaign_id).await;
        Ok(Some(res))
    }

    /// Apply an activeflow deletion.
    pub async fn event_activeflow_deleted(
        &self,
        activeflow: &Activeflow,
    ) -> Result<Option<Campaigncall>, CampaignError> {
        let campaigncall = match self.campaigncalls.get_by_activeflow_id(activeflow.id).await {
            Ok(cc) => cc,
            Err(CampaignError::NotFound { .. }) => {
                debug!(activeflow_id = %activeflow.id, "activeflow is not owned by any campaigncall");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let res = self
            .campaigncalls
            .event_handle_activeflow_deleted(&campaigncall)
            .await?;
        self.settle_stopping(res.campaign_id).await;
        Ok(Some(res))
    }

    /// A `stopping` campaign whose last campaigncall just finished moves to
    /// `stop`.
    async fn settle_stopping(&self, campaign_id: Uuid) {
        let campaign = match self.campaigns.campaign_get(campaign_id).await {
            Ok(c) => c,
            Err(e) => {
                error!(%campaign_id, "could not get the campaign: {}", e);
                return;
            }
        };
        if campaign.status != CampaignStatus::Stopping {
            return;
        }
        match self.campaign_stop(campaign_id).await {
            Ok(c) if c.status == CampaignStatus::Stop => {
                info!(%campaign_id, "campaign drained and stopped");
            }
            Ok(_) => {}
            Err(e) => error!(%campaign_id, "could not settle the stopping campaign: {}", e),
        }
    }
}
