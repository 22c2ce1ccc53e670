//! Storage backends for campaign rows and outdial targets.

pub mod memory;
pub mod outdial;

pub use memory::{
    InMemoryCampaignRepository, InMemoryCampaigncallRepository, InMemoryOutplanRepository,
};
pub use outdial::InMemoryOutdialTargetStore;
