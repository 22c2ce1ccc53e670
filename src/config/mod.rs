//! Configuration models for the engine, the tick worker and its queue.

pub mod service;

pub use service::{EngineConfig, QueueBackendConfig, ServiceConfig, WorkerConfig};
