use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use super::backend::TrackingBackend;
use crate::domain::team::TeamEvent;

/// Sink for team domain events
#[async_trait]
pub trait TeamEventEmitter: Send + Sync {
    /// Emit an event raised in the given course; never fails
    async fn emit(&self, course_id: &str, event: &TeamEvent);
}

/// Emits team events as server-side tracking events
pub struct TrackerEventEmitter {
    backend: Arc<dyn TrackingBackend>,
    host: String,
}

impl TrackerEventEmitter {
    pub fn new(backend: Arc<dyn TrackingBackend>, host: impl Into<String>) -> Self {
        Self {
            backend,
            host: host.into(),
        }
    }

    fn tracking_event(&self, course_id: &str, event: &TeamEvent) -> Value {
        let mut payload = event.payload();
        payload["course_id"] = Value::String(course_id.to_string());

        json!({
            "event_source": "server",
            "event_type": event.event_type(),
            "event": payload,
            "time": Utc::now().to_rfc3339(),
            "host": self.host,
        })
    }
}

#[async_trait]
impl TeamEventEmitter for TrackerEventEmitter {
    async fn emit(&self, course_id: &str, event: &TeamEvent) {
        tracing::debug!(
            course_id,
            event_type = event.event_type(),
            team_id = %event.team_id(),
            "Emitting team event"
        );
        let tracking_event = self.tracking_event(course_id, event);
        self.backend.send(&tracking_event).await;
    }
}
