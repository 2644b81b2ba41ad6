use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::repositories::{RepositoryError, RepositoryResult, User, UserRepository};
use crate::domain::user::value_objects::Email;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> RepositoryResult<User> {
    let email: String = row.try_get("email")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: Email::new(email)
            .map_err(|e| RepositoryError::Corrupt(format!("Invalid email from database: {}", e)))?,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let row =
            sqlx::query("SELECT id, username, email, is_active FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        // Email values are lowercase, so compare against the lowered column
        let row = sqlx::query(
            r#"
            SELECT id, username, email, is_active
            FROM users
            WHERE LOWER(email) = $1
            ORDER BY username
            LIMIT 1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}
