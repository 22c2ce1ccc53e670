//! Tests for webhook notifiers

use prometheus_campaign::core::notify::publish;
use prometheus_campaign::core::{InMemoryNotifier, Notifier};
use uuid::Uuid;

#[test]
fn test_in_memory_notifier_keeps_order() {
    let notifier = InMemoryNotifier::new(10);
    let customer_id = Uuid::new_v4();
    notifier.publish_webhook_event(customer_id, "campaign_created", serde_json::json!({"n": 1}));
    notifier.publish_webhook_event(customer_id, "campaign_updated", serde_json::json!({"n": 2}));

    let events = notifier.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, "campaign_created");
    assert_eq!(events[1].payload["n"], 2);
    assert_eq!(notifier.events_of("campaign_updated").len(), 1);
}

#[test]
fn test_in_memory_notifier_is_bounded() {
    let notifier = InMemoryNotifier::new(2);
    for n in 0..3 {
        notifier.publish_webhook_event(Uuid::nil(), "campaigncall_updated", serde_json::json!(n));
    }
    let events = notifier.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].payload, serde_json::json!(1));
}

#[test]
fn test_publish_serializes_entity() {
    #[derive(serde::Serialize)]
    struct Row {
        id: u32,
    }
    let notifier = InMemoryNotifier::new(4);
    publish(&notifier, Uuid::nil(), "outplan_created", &Row { id: 7 });
    assert_eq!(notifier.events()[0].payload["id"], 7);
}
