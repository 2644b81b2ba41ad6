//! In-memory implementation of every repository trait.
//!
//! Used by the test suites and for running the service without a database.
//! Enforces the same uniqueness rules as the PostgreSQL schema.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::course::CourseContext;
use crate::domain::repositories::{
    CourseRepository, Enrollment, EnrollmentRepository, Membership, RepositoryError,
    RepositoryResult, TeamRepository, TrackingLogRepository, User, UserRepository,
};
use crate::domain::team::{Team, TeamsetId};
use crate::domain::tracking::TrackingLog;
use crate::domain::user::Email;

#[derive(Debug, Clone)]
struct EnrollmentRecord {
    user_id: Uuid,
    course_id: String,
    mode: String,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct MembershipRecord {
    course_id: String,
    membership: Membership,
}

/// Shared in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    courses: RwLock<HashMap<String, CourseContext>>,
    users: RwLock<Vec<User>>,
    enrollments: RwLock<Vec<EnrollmentRecord>>,
    teams: RwLock<Vec<Team>>,
    memberships: RwLock<Vec<MembershipRecord>>,
    tracking_logs: RwLock<Vec<TrackingLog>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a course configuration.
    pub fn add_course(&self, course: CourseContext) {
        self.courses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(course.course_id.clone(), course);
    }

    /// Register an active user.
    pub fn add_user(&self, username: &str, email: Email) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email,
            is_active: true,
        };
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(user.clone());
        user
    }

    /// Mark a user account as deactivated.
    pub fn deactivate_user(&self, user_id: Uuid) {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.is_active = false;
        }
    }

    /// Enroll a user in a course.
    pub fn enroll(&self, user_id: Uuid, course_id: &str, mode: &str) {
        self.push_enrollment(user_id, course_id, mode, true);
    }

    /// Record an enrollment that has been deactivated.
    pub fn enroll_inactive(&self, user_id: Uuid, course_id: &str, mode: &str) {
        self.push_enrollment(user_id, course_id, mode, false);
    }

    fn push_enrollment(&self, user_id: Uuid, course_id: &str, mode: &str, is_active: bool) {
        self.enrollments
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(EnrollmentRecord {
                user_id,
                course_id: course_id.to_string(),
                mode: mode.to_string(),
                is_active,
            });
    }

    /// All teams of a course (for assertions).
    pub fn teams_in_course(&self, course_id: &str) -> Vec<Team> {
        self.teams
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|t| t.course_id() == course_id)
            .cloned()
            .collect()
    }

    /// Member ids of a team (for assertions).
    pub fn members_of(&self, team_id: Uuid) -> Vec<Uuid> {
        self.memberships
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.membership.team_id == team_id)
            .map(|m| m.membership.user_id)
            .collect()
    }

    /// Total number of memberships across courses (for assertions).
    pub fn membership_count(&self) -> usize {
        self.memberships
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Stored tracking log rows (for assertions).
    pub fn tracking_logs(&self) -> Vec<TrackingLog> {
        self.tracking_logs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn find_by_id(&self, course_id: &str) -> RepositoryResult<Option<CourseContext>> {
        Ok(self
            .courses
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(course_id)
            .cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn is_enrolled(&self, user_id: Uuid, course_id: &str) -> RepositoryResult<bool> {
        Ok(self
            .enrollments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|e| e.user_id == user_id && e.course_id == course_id && e.is_active))
    }

    async fn list_enrolled(&self, course_id: &str) -> RepositoryResult<Vec<Enrollment>> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        let mut enrolled: Vec<Enrollment> = self
            .enrollments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| e.course_id == course_id && e.is_active)
            .filter_map(|e| {
                users.iter().find(|u| u.id == e.user_id).map(|u| Enrollment {
                    user_id: u.id,
                    username: u.username.clone(),
                    mode: e.mode.clone(),
                })
            })
            .collect();
        enrolled.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(enrolled)
    }
}

#[async_trait]
impl TeamRepository for InMemoryStore {
    async fn save(&self, team: &Team) -> RepositoryResult<()> {
        let mut teams = self.teams.write().unwrap_or_else(|e| e.into_inner());
        let name_taken = teams.iter().any(|t| {
            t.id() != team.id()
                && t.course_id() == team.course_id()
                && t.teamset_id() == team.teamset_id()
                && t.name() == team.name()
        });
        if name_taken {
            return Err(RepositoryError::Database(format!(
                "duplicate team name '{}' in teamset {}",
                team.name(),
                team.teamset_id()
            )));
        }
        match teams.iter_mut().find(|t| t.id() == team.id()) {
            Some(existing) => *existing = team.clone(),
            None => teams.push(team.clone()),
        }
        Ok(())
    }

    async fn find_by_name(
        &self,
        course_id: &str,
        teamset_id: &TeamsetId,
        name: &str,
    ) -> RepositoryResult<Option<Team>> {
        Ok(self
            .teams
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|t| {
                t.course_id() == course_id && t.teamset_id() == teamset_id && t.name() == name
            })
            .cloned())
    }

    async fn member_count(&self, team_id: Uuid) -> RepositoryResult<usize> {
        Ok(self.members_of(team_id).len())
    }

    async fn member_ids_in_teamset(
        &self,
        course_id: &str,
        teamset_id: &TeamsetId,
    ) -> RepositoryResult<HashSet<Uuid>> {
        Ok(self
            .memberships
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.course_id == course_id && &m.membership.teamset_id == teamset_id)
            .map(|m| m.membership.user_id)
            .collect())
    }

    async fn add_member(&self, team: &Team, user_id: Uuid) -> RepositoryResult<()> {
        let team_exists = self
            .teams
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|t| t.id() == team.id());
        if !team_exists {
            return Err(RepositoryError::NotFound(format!("team {}", team.id())));
        }

        let mut memberships = self.memberships.write().unwrap_or_else(|e| e.into_inner());
        let conflict = memberships.iter().any(|m| {
            m.course_id == team.course_id()
                && &m.membership.teamset_id == team.teamset_id()
                && m.membership.user_id == user_id
        });
        if conflict {
            return Err(RepositoryError::AlreadyOnTeamInTeamset {
                user_id,
                teamset_id: team.teamset_id().to_string(),
            });
        }

        memberships.push(MembershipRecord {
            course_id: team.course_id().to_string(),
            membership: Membership {
                user_id,
                team_id: team.id(),
                teamset_id: team.teamset_id().clone(),
                team_name: team.name().to_string(),
            },
        });
        Ok(())
    }

    async fn memberships_for_course(&self, course_id: &str) -> RepositoryResult<Vec<Membership>> {
        Ok(self
            .memberships
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.course_id == course_id)
            .map(|m| m.membership.clone())
            .collect())
    }
}

#[async_trait]
impl TrackingLogRepository for InMemoryStore {
    async fn insert(&self, log: &TrackingLog) -> RepositoryResult<()> {
        self.tracking_logs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(log.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: &str) -> TeamsetId {
        TeamsetId::new(id).unwrap()
    }

    fn email(address: &str) -> Email {
        Email::new(address).unwrap()
    }

    fn team(course_id: &str, teamset: &str, name: &str) -> Team {
        Team::new(course_id.to_string(), topic(teamset), name.to_string(), String::new())
            .unwrap()
            .0
    }

    #[tokio::test]
    async fn second_membership_in_teamset_is_rejected() {
        let store = InMemoryStore::new();
        let user = store.add_user("alice", email("alice@example.com"));
        let red = team("course-1", "topic_0", "Red");
        let blue = team("course-1", "topic_0", "Blue");
        store.save(&red).await.unwrap();
        store.save(&blue).await.unwrap();

        store.add_member(&red, user.id).await.unwrap();
        let err = store.add_member(&blue, user.id).await.unwrap_err();

        assert!(matches!(err, RepositoryError::AlreadyOnTeamInTeamset { .. }));
        assert_eq!(store.member_count(blue.id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn memberships_in_different_teamsets_coexist() {
        let store = InMemoryStore::new();
        let user = store.add_user("alice", email("alice@example.com"));
        let red = team("course-1", "topic_0", "Red");
        let green = team("course-1", "topic_1", "Green");
        store.save(&red).await.unwrap();
        store.save(&green).await.unwrap();

        store.add_member(&red, user.id).await.unwrap();
        store.add_member(&green, user.id).await.unwrap();

        assert_eq!(store.membership_count(), 2);
    }

    #[tokio::test]
    async fn duplicate_team_name_in_teamset_is_rejected() {
        let store = InMemoryStore::new();
        store.save(&team("course-1", "topic_0", "Red")).await.unwrap();

        let result = store.save(&team("course-1", "topic_0", "Red")).await;
        assert!(result.is_err());

        // Same name in another teamset is fine
        store.save(&team("course-1", "topic_1", "Red")).await.unwrap();
    }

    #[tokio::test]
    async fn find_user_by_email_is_case_insensitive() {
        let store = InMemoryStore::new();
        let user = store.add_user("bob", email("Bob@Example.com"));

        let found = store
            .find_by_email(&Email::new("BOB@example.COM").unwrap())
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn inactive_enrollments_are_not_listed() {
        let store = InMemoryStore::new();
        let alice = store.add_user("alice", email("alice@example.com"));
        let bob = store.add_user("bob", email("bob@example.com"));
        store.enroll(bob.id, "course-1", "audit");
        store.enroll(alice.id, "course-1", "verified");
        store.enroll_inactive(alice.id, "course-2", "verified");

        let enrolled = store.list_enrolled("course-1").await.unwrap();
        let names: Vec<&str> = enrolled.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert!(!store.is_enrolled(alice.id, "course-2").await.unwrap());
    }
}
