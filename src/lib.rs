//! # Prometheus Campaign
//!
//! Execution core for outbound dialing campaigns.
//!
//! A campaign binds a dial policy (outplan) to a list of contactable
//! targets (outdial), each with up to five destination slots. Once a
//! campaign is set to run, the engine advances it one stateless tick at a
//! time: every tick re-reads the campaign, checks agent capacity, picks the
//! next eligible target slot, dispatches one call or flow, and schedules
//! the next tick. Call hangups and flow completions come back as events and
//! decide whether a slot is retried or finished.
//!
//! ## Key Features
//!
//! - **Admission control**: dialing is throttled by
//!   `floor(available_agents * service_level / 100)`
//! - **Slot selection**: first slot with a destination and tries left wins
//! - **Compare-and-swap slot claims**: concurrent ticks never dial one slot twice
//! - **Self-dispatch**: ticks are delayed messages, realised by a broker or
//!   the bundled [`runtime::TickWorker`] over an in-memory or file queue
//! - **Stopping convergence**: a stop request waits for ongoing attempts
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use prometheus_campaign::builders::{build_tick_queue, EngineBuilder};
//! use prometheus_campaign::config::ServiceConfig;
//! use prometheus_campaign::core::QueueScheduler;
//! use prometheus_campaign::runtime::{TickWorker, TokioSpawner};
//!
//! let cfg = ServiceConfig::from_env()?;
//! let queue = build_tick_queue(&cfg.worker)?;
//! let last_seq = queue.last_seq();
//! let queue = Arc::new(Mutex::new(queue));
//! let engine = Arc::new(
//!     EngineBuilder::new()
//!         .with_config(cfg.engine.clone())
//!         .with_outdials(outdials)
//!         .with_targets(targets)
//!         .with_calls(calls)
//!         .with_flows(flows)
//!         .with_queues(queues)
//!         .with_scheduler(Arc::new(QueueScheduler::resume(Arc::clone(&queue), last_seq)))
//!         .build()?,
//! );
//! let worker = TickWorker::new(engine, queue, TokioSpawner::current(), &cfg.worker);
//! worker.run(shutdown_rx).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Domain logic: admission, target selection, attempt tracking, the engine.
pub mod core;
/// Persisted entities and collaborator payloads.
pub mod models;
/// Configuration models for the engine and the tick worker.
pub mod config;
/// Builders assembling the engine and its tick queue.
pub mod builders;
/// Storage and tick queue backends.
pub mod infra;
/// Tokio spawner and tick worker.
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Shared utilities.
pub mod util;
