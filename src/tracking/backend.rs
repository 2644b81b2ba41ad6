use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::repositories::TrackingLogRepository;
use crate::domain::tracking::TrackingLog;

/// Destination for tracking events
///
/// Sending is fire-and-forget: a backend never reports failure to the caller.
#[async_trait]
pub trait TrackingBackend: Send + Sync {
    async fn send(&self, event: &Value);
}

/// Tracking backend that saves events to the tracking log table
///
/// Kept for legacy support; the stored shape is tied to the flat event
/// schema in [`crate::domain::tracking::LOG_FIELDS`].
pub struct DatabaseBackend {
    name: String,
    repository: Arc<dyn TrackingLogRepository>,
}

impl DatabaseBackend {
    /// Creates a new DatabaseBackend
    ///
    /// # Arguments
    /// * `name` - Label of the database the rows go to, used in log output
    /// * `repository` - Store for tracking log rows
    pub fn new(name: impl Into<String>, repository: Arc<dyn TrackingLogRepository>) -> Self {
        Self {
            name: name.into(),
            repository,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl TrackingBackend for DatabaseBackend {
    async fn send(&self, event: &Value) {
        let log = TrackingLog::from_event(event);
        if let Err(e) = self.repository.insert(&log).await {
            tracing::error!(
                backend = %self.name,
                event_type = %log.event_type,
                error = %e,
                "Failed to save tracking log"
            );
        }
    }
}
