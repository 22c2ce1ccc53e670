//! Infrastructure adapters for tick queues and storage backends.

pub mod queue;
pub mod store;

pub use queue::{FileTickQueue, InMemoryTickQueue};
pub use store::{
    InMemoryCampaignRepository, InMemoryCampaigncallRepository, InMemoryOutdialTargetStore,
    InMemoryOutplanRepository,
};
