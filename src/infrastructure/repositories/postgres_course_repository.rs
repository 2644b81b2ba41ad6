use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::course::{CourseContext, Teamset, TeamsetType};
use crate::domain::repositories::{CourseRepository, RepositoryError, RepositoryResult};
use crate::domain::team::TeamsetId;

/// PostgreSQL implementation of CourseRepository
///
/// Reads a course's teams configuration from `courses` and `course_teamsets`.
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn team_size(value: Option<i32>) -> RepositoryResult<Option<u32>> {
    value
        .map(|v| {
            u32::try_from(v)
                .map_err(|_| RepositoryError::Corrupt(format!("negative team size {}", v)))
        })
        .transpose()
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn find_by_id(&self, course_id: &str) -> RepositoryResult<Option<CourseContext>> {
        let course = sqlx::query("SELECT id, default_max_team_size FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(course) = course else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT teamset_id, name, max_team_size, teamset_type
            FROM course_teamsets
            WHERE course_id = $1
            ORDER BY teamset_id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let teamsets = rows
            .iter()
            .map(|r| -> RepositoryResult<Teamset> {
                let id: String = r.try_get("teamset_id")?;
                let teamset_type: String = r.try_get("teamset_type")?;
                Ok(Teamset {
                    id: TeamsetId::new(id).map_err(RepositoryError::Corrupt)?,
                    name: r.try_get("name")?,
                    max_team_size: team_size(r.try_get("max_team_size")?)?,
                    teamset_type: TeamsetType::parse(&teamset_type),
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Some(CourseContext {
            course_id: course.try_get("id")?,
            teamsets,
            default_max_team_size: team_size(course.try_get("default_max_team_size")?)?,
        }))
    }
}
