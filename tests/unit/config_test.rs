//! Tests for configuration validation

use prometheus_campaign::config::{EngineConfig, QueueBackendConfig, ServiceConfig, WorkerConfig};

#[test]
fn test_engine_defaults() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.run_delay_ms, 1000);
    assert_eq!(cfg.dispatch_delay_ms, 500);
    assert_eq!(cfg.backoff_delay_ms, 5000);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_engine_invalid_dispatch_delay() {
    let cfg = EngineConfig {
        dispatch_delay_ms: 0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_engine_backoff_shorter_than_dispatch() {
    let cfg = EngineConfig {
        dispatch_delay_ms: 500,
        backoff_delay_ms: 100,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_worker_invalid_values() {
    let cfg = WorkerConfig {
        max_concurrent_ticks: 0,
        ..WorkerConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = WorkerConfig {
        max_queue_depth: 0,
        ..WorkerConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_service_config_from_json() {
    let json = r#"{
        "engine": { "backoff_delay_ms": 10000 },
        "worker": { "poll_interval_ms": 50, "queue": { "kind": "file", "path": "/tmp/ticks" } }
    }"#;
    let cfg = ServiceConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.engine.backoff_delay_ms, 10_000);
    assert_eq!(cfg.engine.dispatch_delay_ms, 500);
    assert_eq!(cfg.worker.poll_interval_ms, 50);
    assert_eq!(
        cfg.worker.queue,
        QueueBackendConfig::File {
            path: "/tmp/ticks".into()
        }
    );
}

#[test]
fn test_service_config_rejects_invalid_values() {
    let json = r#"{ "worker": { "poll_interval_ms": 0 } }"#;
    let err = ServiceConfig::from_json_str(json).unwrap_err();
    assert!(err.contains("worker invalid"));
    assert!(ServiceConfig::from_json_str("not json").is_err());
}
