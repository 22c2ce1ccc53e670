//! Persisted entities and the collaborator payloads the engine consumes.

pub mod address;
pub mod campaign;
pub mod campaigncall;
pub mod external;
pub mod outdial_target;
pub mod outplan;

pub use address::{Address, AddressType};
pub use campaign::{
    Action, Campaign, CampaignStatus, CampaignType, EndHandle, Execute, EVENT_CAMPAIGN_CREATED,
    EVENT_CAMPAIGN_DELETED, EVENT_CAMPAIGN_UPDATED,
};
pub use campaigncall::{
    Campaigncall, CampaigncallResult, CampaigncallStatus, ReferenceType,
    EVENT_CAMPAIGNCALL_CREATED, EVENT_CAMPAIGNCALL_UPDATED,
};
pub use external::{
    Activeflow, ActiveflowReferenceType, Agent, AgentStatus, Call, Flow, HangupReason, Outdial,
    Queue,
};
pub use outdial_target::{DestinationSlot, OutdialTarget, OutdialTargetStatus};
pub use outplan::{
    Outplan, MAX_DESTINATION_SLOTS, EVENT_OUTPLAN_CREATED, EVENT_OUTPLAN_DELETED,
    EVENT_OUTPLAN_UPDATED,
};
