use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;

/// An active enrollment, joined with the learner's username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub user_id: Uuid,
    pub username: String,
    /// Enrollment track, e.g. `audit`, `verified`, `masters`
    pub mode: String,
}

/// Repository trait for course enrollments
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Whether the user is actively enrolled in the course
    async fn is_enrolled(&self, user_id: Uuid, course_id: &str) -> RepositoryResult<bool>;

    /// Active enrollments of a course, ordered by username
    async fn list_enrolled(&self, course_id: &str) -> RepositoryResult<Vec<Enrollment>>;
}
