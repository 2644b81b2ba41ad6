// Repository interfaces (ports) for the domain
// Implementations live in the infrastructure layer

pub mod course_repository;
pub mod enrollment_repository;
pub mod team_repository;
pub mod tracking_log_repository;
pub mod user_repository;

pub use course_repository::CourseRepository;
pub use enrollment_repository::{Enrollment, EnrollmentRepository};
pub use team_repository::{Membership, TeamRepository};
pub use tracking_log_repository::TrackingLogRepository;
pub use user_repository::{User, UserRepository};

use thiserror::Error;

/// Errors surfaced by repository implementations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The user already holds a membership in this teamset
    #[error("user {user_id} is already on a team in teamset {teamset_id}")]
    AlreadyOnTeamInTeamset { user_id: uuid::Uuid, teamset_id: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// Stored data could not be mapped back into the domain
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
