use thiserror::Error;

use crate::domain::repositories::RepositoryError;

/// Failures that prevent a roster operation from producing a result at all
///
/// Problems with the roster's content are not errors; they are reported as
/// [`super::RosterIssue`]s inside the import result.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Failed to write CSV: {0}")]
    Write(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for RosterError {
    fn from(err: csv::Error) -> Self {
        RosterError::InvalidCsv(err.to_string())
    }
}

pub type RosterResult<T> = Result<T, RosterError>;
