use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::team::value_objects::TeamsetId;
use crate::domain::team::Team;

/// A user's seat on a team, denormalized with the team's teamset and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub teamset_id: TeamsetId,
    pub team_name: String,
}

/// Repository trait for Team aggregate and its memberships
///
/// Implementations must reject a second membership for the same user inside
/// one `(course, teamset)` with `RepositoryError::AlreadyOnTeamInTeamset`.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Save a team (insert or update)
    async fn save(&self, team: &Team) -> RepositoryResult<()>;

    /// Find a team by its name inside one teamset of a course
    async fn find_by_name(
        &self,
        course_id: &str,
        teamset_id: &TeamsetId,
        name: &str,
    ) -> RepositoryResult<Option<Team>>;

    /// Number of members currently on a team
    async fn member_count(&self, team_id: Uuid) -> RepositoryResult<usize>;

    /// IDs of every user holding a membership in the teamset
    async fn member_ids_in_teamset(
        &self,
        course_id: &str,
        teamset_id: &TeamsetId,
    ) -> RepositoryResult<HashSet<Uuid>>;

    /// Add a user to a team
    async fn add_member(&self, team: &Team, user_id: Uuid) -> RepositoryResult<()>;

    /// All memberships held in a course
    async fn memberships_for_course(&self, course_id: &str) -> RepositoryResult<Vec<Membership>>;
}
