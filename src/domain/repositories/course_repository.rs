use async_trait::async_trait;

use super::RepositoryResult;
use crate::domain::course::CourseContext;

/// Repository trait for course teams configuration
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Load a course with its configured teamsets
    async fn find_by_id(&self, course_id: &str) -> RepositoryResult<Option<CourseContext>>;
}
