//! Campaign domain logic: admission, target selection, attempt tracking and
//! the engine that ties them together.

pub mod admission;
pub mod campaigncall;
pub mod engine;
pub mod error;
pub mod notify;
pub mod outdial;
pub mod outplan;
pub mod ports;
pub mod schedule;
pub mod store;

pub use campaigncall::{CampaigncallCreate, CampaigncallTracker};
pub use engine::{
    BackoffReason, BasicInfo, CampaignCreate, CampaignEngine, EngineParts, HaltReason,
    InboundEvent, ResourceInfo, TickOutcome,
};
pub use error::{AppResult, CampaignError};
pub use notify::{InMemoryNotifier, Notifier, TracingNotifier, WebhookEvent};
pub use outdial::{select_destination, OutdialStore, OutdialTargetStore, SelectedDestination};
pub use outplan::{DialInfo, OutplanCreate, OutplanHandler};
pub use ports::{CallCreateRequest, CallService, FlowService, QueueService};
pub use schedule::{ExecuteScheduler, QueueScheduler, ScheduledTick, Spawn, TickQueue};
pub use store::{CampaignRepository, CampaigncallRepository, OutplanRepository};
