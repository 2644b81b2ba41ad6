use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::repositories::{Membership, RepositoryError, RepositoryResult, TeamRepository};
use crate::domain::team::{Team, TeamsetId};

/// Unique constraint guarding one membership per user and teamset
const ONE_PER_TEAMSET_CONSTRAINT: &str = "course_team_memberships_one_per_teamset";

/// PostgreSQL implementation of TeamRepository
///
/// Provides persistence for Team aggregates and their memberships.
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn team_from_row(row: &PgRow) -> RepositoryResult<Team> {
    let teamset_id: String = row.try_get("teamset_id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Team::from_persistence(
        row.try_get("id")?,
        row.try_get("course_id")?,
        TeamsetId::new(teamset_id).map_err(RepositoryError::Corrupt)?,
        row.try_get("name")?,
        row.try_get("description")?,
        created_at,
    ))
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn save(&self, team: &Team) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO course_teams (id, course_id, teamset_id, name, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description
            "#,
        )
        .bind(team.id())
        .bind(team.course_id())
        .bind(team.teamset_id().as_str())
        .bind(team.name())
        .bind(team.description())
        .bind(team.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_name(
        &self,
        course_id: &str,
        teamset_id: &TeamsetId,
        name: &str,
    ) -> RepositoryResult<Option<Team>> {
        let row = sqlx::query(
            r#"
            SELECT id, course_id, teamset_id, name, description, created_at
            FROM course_teams
            WHERE course_id = $1 AND teamset_id = $2 AND name = $3
            "#,
        )
        .bind(course_id)
        .bind(teamset_id.as_str())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(team_from_row).transpose()
    }

    async fn member_count(&self, team_id: Uuid) -> RepositoryResult<usize> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM course_team_memberships WHERE team_id = $1")
                .bind(team_id)
                .fetch_one(&self.pool)
                .await?;

        usize::try_from(count).map_err(|e| RepositoryError::Corrupt(e.to_string()))
    }

    async fn member_ids_in_teamset(
        &self,
        course_id: &str,
        teamset_id: &TeamsetId,
    ) -> RepositoryResult<HashSet<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM course_team_memberships
            WHERE course_id = $1 AND teamset_id = $2
            "#,
        )
        .bind(course_id)
        .bind(teamset_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn add_member(&self, team: &Team, user_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO course_team_memberships (team_id, user_id, course_id, teamset_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(team.id())
        .bind(user_id)
        .bind(team.course_id())
        .bind(team.teamset_id().as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(ONE_PER_TEAMSET_CONSTRAINT) =>
            {
                Err(RepositoryError::AlreadyOnTeamInTeamset {
                    user_id,
                    teamset_id: team.teamset_id().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn memberships_for_course(&self, course_id: &str) -> RepositoryResult<Vec<Membership>> {
        let rows = sqlx::query(
            r#"
            SELECT m.user_id, m.team_id, m.teamset_id, t.name AS team_name
            FROM course_team_memberships m
            JOIN course_teams t ON t.id = m.team_id
            WHERE m.course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> RepositoryResult<Membership> {
                let teamset_id: String = r.try_get("teamset_id")?;
                Ok(Membership {
                    user_id: r.try_get("user_id")?,
                    team_id: r.try_get("team_id")?,
                    teamset_id: TeamsetId::new(teamset_id).map_err(RepositoryError::Corrupt)?,
                    team_name: r.try_get("team_name")?,
                })
            })
            .collect()
    }
}
