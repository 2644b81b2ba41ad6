use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::repositories::{RepositoryResult, TrackingLogRepository};
use crate::domain::tracking::TrackingLog;

/// PostgreSQL implementation of TrackingLogRepository (`track_trackinglog`)
pub struct PostgresTrackingLogRepository {
    pool: PgPool,
}

impl PostgresTrackingLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackingLogRepository for PostgresTrackingLogRepository {
    async fn insert(&self, log: &TrackingLog) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO track_trackinglog (
                dtcreated, username, ip, event_source, event_type,
                event, agent, page, time, host
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(log.dtcreated)
        .bind(&log.username)
        .bind(&log.ip)
        .bind(&log.event_source)
        .bind(&log.event_type)
        .bind(&log.event)
        .bind(&log.agent)
        .bind(&log.page)
        .bind(log.time)
        .bind(&log.host)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
