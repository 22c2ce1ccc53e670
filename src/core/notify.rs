//! Webhook notifier abstraction and in-process sinks.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::util::clock::now_ms;

/// Webhook event as handed to the notifier.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    /// Customer the event belongs to.
    pub customer_id: Uuid,
    /// Event type, e.g. `campaigncall_created`.
    pub event_type: String,
    /// Serialized entity.
    pub payload: serde_json::Value,
    /// Publish time (ms since epoch).
    pub created_at_ms: u64,
}

/// Publishes customer-facing webhook events. Fire-and-forget: delivery
/// failures are the notifier's concern and never fail the caller.
pub trait Notifier: Send + Sync {
    /// Publish one event.
    fn publish_webhook_event(&self, customer_id: Uuid, event_type: &str, payload: serde_json::Value);
}

/// Serialize `entity` and publish it; serialization failures are logged.
pub fn publish<T: Serialize>(
    notifier: &dyn Notifier,
    customer_id: Uuid,
    event_type: &str,
    entity: &T,
) {
    match serde_json::to_value(entity) {
        Ok(payload) => notifier.publish_webhook_event(customer_id, event_type, payload),
        Err(e) => tracing::error!(event_type, "could not serialize webhook payload: {}", e),
    }
}

/// Bounded in-memory notifier for testing and dev.
pub struct InMemoryNotifier {
    events: Mutex<VecDeque<WebhookEvent>>,
    max_events: usize,
}

impl InMemoryNotifier {
    /// Create a notifier keeping at most `max_events`, oldest dropped first.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Snapshot of stored events.
    pub fn events(&self) -> Vec<WebhookEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored events of one type.
    pub fn events_of(&self, event_type: &str) -> Vec<WebhookEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }
}

impl Notifier for InMemoryNotifier {
    fn publish_webhook_event(&self, customer_id: Uuid, event_type: &str, payload: serde_json::Value) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(WebhookEvent {
            customer_id,
            event_type: event_type.to_string(),
            payload,
            created_at_ms: now_ms(),
        });
    }
}

/// Notifier that only logs. Default when no delivery channel is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn publish_webhook_event(&self, customer_id: Uuid, event_type: &str, payload: serde_json::Value) {
        tracing::info!(%customer_id, event_type, %payload, "webhook event");
    }
}
