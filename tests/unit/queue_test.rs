//! Tests for the file-backed tick queue and queue selection

use std::path::PathBuf;

use prometheus_campaign::builders::{build_tick_queue, LocalTickQueue};
use prometheus_campaign::config::{QueueBackendConfig, WorkerConfig};
use prometheus_campaign::core::{ScheduledTick, TickQueue};
use prometheus_campaign::infra::FileTickQueue;
use uuid::Uuid;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("campaign-{name}-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn tick(due_ms: u64, seq: u64) -> ScheduledTick {
    ScheduledTick {
        campaign_id: Uuid::new_v4(),
        due_ms,
        seq,
    }
}

#[test]
fn test_file_queue_survives_reopen() {
    let dir = temp_dir("reopen");
    let first = tick(2000, 1);
    let second = tick(1000, 2);
    {
        let mut q = FileTickQueue::new(&dir, "ticks", 10).unwrap();
        q.push(first.clone()).unwrap();
        q.push(second.clone()).unwrap();
    }

    let mut q = FileTickQueue::new(&dir, "ticks", 10).unwrap();
    assert_eq!(q.len(), 2);
    assert_eq!(q.max_seq(), 2);
    assert_eq!(q.pop_due(5000).unwrap(), Some(second));

    let mut q = FileTickQueue::new(&dir, "ticks", 10).unwrap();
    assert_eq!(q.len(), 1);
    assert_eq!(q.pop_due(5000).unwrap(), Some(first));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_file_queue_respects_due_time_and_depth() {
    let dir = temp_dir("depth");
    let mut q = FileTickQueue::new(&dir, "ticks", 1).unwrap();
    q.push(tick(1000, 1)).unwrap();
    assert!(q.push(tick(1000, 2)).is_err());
    assert!(q.pop_due(999).unwrap().is_none());
    assert_eq!(q.next_due(), Some(1000));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_build_tick_queue_selects_backend() {
    let q = build_tick_queue(&WorkerConfig::default()).unwrap();
    assert!(matches!(q, LocalTickQueue::Memory(_)));

    let dir = temp_dir("build");
    let cfg = WorkerConfig {
        queue: QueueBackendConfig::File { path: dir.clone() },
        ..WorkerConfig::default()
    };
    let q = build_tick_queue(&cfg).unwrap();
    assert!(matches!(q, LocalTickQueue::File(_)));
    assert!(q.is_empty());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_file_queue_keeps_tick_when_pop_cannot_persist() {
    let dir = temp_dir("pop-error");
    let due = tick(10, 1);
    let mut q = FileTickQueue::new(&dir, "s", 10).unwrap();
    q.push(due.clone()).unwrap();

    // Make the backing file unwritable.
    let file = dir.join("s.jsonl");
    std::fs::remove_file(&file).unwrap();
    std::fs::create_dir(&file).unwrap();

    assert!(q.pop_due(10).is_err());
    assert_eq!(q.len(), 1);
    assert_eq!(q.next_due(), Some(10));

    std::fs::remove_dir(&file).unwrap();
    assert_eq!(q.pop_due(10).unwrap(), Some(due));
    assert!(q.is_empty());
    let _ = std::fs::remove_dir_all(dir);
}
