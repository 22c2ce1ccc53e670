//! Tokio runtime adapters: the spawner and the tick worker that drains due
//! ticks into the engine.

pub mod tick_worker;
pub mod tokio_spawner;

pub use tick_worker::TickWorker;
pub use tokio_spawner::TokioSpawner;
