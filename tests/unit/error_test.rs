//! Tests for error types

use prometheus_campaign::core::CampaignError;
use uuid::Uuid;

#[test]
fn test_not_found_error() {
    let id = Uuid::nil();
    let err = CampaignError::not_found("campaign", id);
    assert_eq!(format!("{err}"), format!("campaign not found: {id}"));
}

#[test]
fn test_invalid_transition_error() {
    let err = CampaignError::InvalidTransition {
        from: "stopping".into(),
        to: "run".into(),
    };
    assert_eq!(format!("{err}"), "invalid transition: stopping -> run");
}

#[test]
fn test_queue_full_error() {
    let err = CampaignError::QueueFull("max queue depth reached".to_string());
    assert_eq!(format!("{err}"), "queue full: max queue depth reached");
}

#[test]
fn test_backend_error() {
    let err = CampaignError::Backend("connection failed".to_string());
    assert_eq!(format!("{err}"), "backend error: connection failed");
}

#[test]
fn test_only_slot_conflict_is_contention() {
    let conflict = CampaignError::SlotConflict {
        target_id: Uuid::nil(),
        index: 2,
    };
    assert!(conflict.is_contention());
    assert_eq!(
        format!("{conflict}"),
        format!("slot conflict: target {} slot 2", Uuid::nil())
    );
    assert!(!CampaignError::Dependency("call service down".into()).is_contention());
}

#[test]
fn test_anyhow_conversion() {
    fn wiring() -> prometheus_campaign::core::AppResult<()> {
        Err(CampaignError::UnknownHangupReason("weird".into()))?;
        Ok(())
    }
    let err = wiring().unwrap_err();
    assert!(err.to_string().contains("unknown hangup reason"));
}
