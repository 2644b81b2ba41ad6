use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::repositories::{Enrollment, EnrollmentRepository, RepositoryResult};

/// PostgreSQL implementation of EnrollmentRepository
pub struct PostgresEnrollmentRepository {
    pool: PgPool,
}

impl PostgresEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentRepository for PostgresEnrollmentRepository {
    async fn is_enrolled(&self, user_id: Uuid, course_id: &str) -> RepositoryResult<bool> {
        let enrolled: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM course_enrollments
                WHERE user_id = $1 AND course_id = $2 AND is_active
            )
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(enrolled)
    }

    async fn list_enrolled(&self, course_id: &str) -> RepositoryResult<Vec<Enrollment>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id AS user_id, u.username, e.mode
            FROM course_enrollments e
            JOIN users u ON u.id = e.user_id
            WHERE e.course_id = $1 AND e.is_active
            ORDER BY u.username
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> RepositoryResult<Enrollment> {
                Ok(Enrollment {
                    user_id: r.try_get("user_id")?,
                    username: r.try_get("username")?,
                    mode: r.try_get("mode")?,
                })
            })
            .collect()
    }
}
