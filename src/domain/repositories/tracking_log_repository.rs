use async_trait::async_trait;

use super::RepositoryResult;
use crate::domain::tracking::TrackingLog;

/// Repository trait for the legacy tracking log table
#[async_trait]
pub trait TrackingLogRepository: Send + Sync {
    /// Insert one tracking log row
    async fn insert(&self, log: &TrackingLog) -> RepositoryResult<()>;
}
