//! Builders assembling the engine and its tick queue from configuration.

pub mod engine_builder;
pub mod queue_builder;

pub use engine_builder::EngineBuilder;
pub use queue_builder::{build_tick_queue, LocalTickQueue};
