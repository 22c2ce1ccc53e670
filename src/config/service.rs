//! Engine and worker configuration structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Tick pacing and scan limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay before the first tick after a run request.
    pub run_delay_ms: u64,
    /// Delay between ticks while dispatching.
    pub dispatch_delay_ms: u64,
    /// Delay after a capacity or empty-list backoff.
    pub backoff_delay_ms: u64,
    /// Max dialing campaigncalls read for the admission count.
    pub dialing_scan_limit: usize,
    /// Max ongoing campaigncalls read when deciding stop vs stopping.
    pub ongoing_scan_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_delay_ms: 1000,
            dispatch_delay_ms: 500,
            backoff_delay_ms: 5000,
            dialing_scan_limit: 100,
            ongoing_scan_limit: 100,
        }
    }
}

impl EngineConfig {
    /// Validate engine configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.dispatch_delay_ms == 0 {
            return Err("dispatch_delay_ms must be greater than 0".into());
        }
        if self.backoff_delay_ms < self.dispatch_delay_ms {
            return Err("backoff_delay_ms must not be shorter than dispatch_delay_ms".into());
        }
        if self.dialing_scan_limit == 0 {
            return Err("dialing_scan_limit must be greater than 0".into());
        }
        if self.ongoing_scan_limit == 0 {
            return Err("ongoing_scan_limit must be greater than 0".into());
        }
        Ok(())
    }
}

/// Tick queue backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum QueueBackendConfig {
    /// In-memory heap; ticks are lost on restart.
    InMemory,
    /// JSON-lines file; pending ticks survive restarts.
    File {
        /// Directory holding the queue file.
        path: PathBuf,
    },
}

/// Tick worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// How often the worker looks for due ticks.
    pub poll_interval_ms: u64,
    /// Maximum pending ticks.
    pub max_queue_depth: usize,
    /// Ticks executed concurrently.
    pub max_concurrent_ticks: usize,
    /// Queue backend.
    pub queue: QueueBackendConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            max_queue_depth: 10_000,
            max_concurrent_ticks: num_cpus::get(),
            queue: QueueBackendConfig::InMemory,
        }
    }
}

impl WorkerConfig {
    /// Validate worker configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".into());
        }
        if self.max_queue_depth == 0 {
            return Err("max_queue_depth must be greater than 0".into());
        }
        if self.max_concurrent_ticks == 0 {
            return Err("max_concurrent_ticks must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Engine pacing.
    pub engine: EngineConfig,
    /// Tick worker.
    pub worker: WorkerConfig,
}

impl ServiceConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.engine.validate().map_err(|e| format!("engine invalid: {e}"))?;
        self.worker.validate().map_err(|e| format!("worker invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `CAMPAIGN_*` environment variables, after
    /// loading a `.env` file if one exists.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        override_from_env("CAMPAIGN_RUN_DELAY_MS", &mut cfg.engine.run_delay_ms)?;
        override_from_env("CAMPAIGN_DISPATCH_DELAY_MS", &mut cfg.engine.dispatch_delay_ms)?;
        override_from_env("CAMPAIGN_BACKOFF_DELAY_MS", &mut cfg.engine.backoff_delay_ms)?;
        override_from_env("CAMPAIGN_DIALING_SCAN_LIMIT", &mut cfg.engine.dialing_scan_limit)?;
        override_from_env("CAMPAIGN_ONGOING_SCAN_LIMIT", &mut cfg.engine.ongoing_scan_limit)?;
        override_from_env("CAMPAIGN_POLL_INTERVAL_MS", &mut cfg.worker.poll_interval_ms)?;
        override_from_env("CAMPAIGN_MAX_QUEUE_DEPTH", &mut cfg.worker.max_queue_depth)?;
        override_from_env("CAMPAIGN_MAX_CONCURRENT_TICKS", &mut cfg.worker.max_concurrent_ticks)?;
        if let Ok(path) = std::env::var("CAMPAIGN_QUEUE_PATH") {
            cfg.worker.queue = QueueBackendConfig::File { path: path.into() };
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn override_from_env<T>(key: &str, slot: &mut T) -> AppResult<()>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(raw) = std::env::var(key) {
        *slot = raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}: invalid value `{raw}`: {e}"))?;
    }
    Ok(())
}
