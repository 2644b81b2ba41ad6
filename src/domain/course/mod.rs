// Course domain module
// Read-only view of a course's teams configuration

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::team::value_objects::TeamsetId;

/// How teams inside a teamset are formed and who can see them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamsetType {
    /// Learners create and join teams themselves
    #[default]
    Open,
    /// Staff-managed, visible to all learners
    PublicManaged,
    /// Staff-managed, visible only to members
    PrivateManaged,
}

impl TeamsetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamsetType::Open => "open",
            TeamsetType::PublicManaged => "public_managed",
            TeamsetType::PrivateManaged => "private_managed",
        }
    }

    /// Parses the stored representation, falling back to `Open`
    pub fn parse(value: &str) -> Self {
        match value {
            "public_managed" => TeamsetType::PublicManaged,
            "private_managed" => TeamsetType::PrivateManaged,
            _ => TeamsetType::Open,
        }
    }
}

impl fmt::Display for TeamsetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A teamset configured for a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teamset {
    pub id: TeamsetId,
    pub name: String,
    /// Overrides the course default when set
    pub max_team_size: Option<u32>,
    pub teamset_type: TeamsetType,
}

impl Teamset {
    pub fn new(id: TeamsetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            max_team_size: None,
            teamset_type: TeamsetType::Open,
        }
    }

    pub fn with_max_team_size(mut self, max_team_size: u32) -> Self {
        self.max_team_size = Some(max_team_size);
        self
    }
}

/// Course configuration snapshot handed to roster operations
///
/// Supplied explicitly by the caller at the start of an import or export run,
/// so nothing downstream needs to look the course up again.
///
/// # Example
/// ```
/// use course_teams::domain::course::{CourseContext, Teamset};
/// use course_teams::domain::team::value_objects::TeamsetId;
///
/// let topic = TeamsetId::new("topic_0").unwrap();
/// let course = CourseContext::new("course-v1:Org+CS101+2024")
///     .with_teamset(Teamset::new(topic.clone(), "Topic 0"))
///     .with_default_max_team_size(4);
///
/// assert_eq!(course.max_team_size_for(&topic), Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseContext {
    pub course_id: String,
    pub teamsets: Vec<Teamset>,
    pub default_max_team_size: Option<u32>,
}

impl CourseContext {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            teamsets: Vec::new(),
            default_max_team_size: None,
        }
    }

    pub fn with_teamset(mut self, teamset: Teamset) -> Self {
        self.teamsets.push(teamset);
        self
    }

    pub fn with_default_max_team_size(mut self, max_team_size: u32) -> Self {
        self.default_max_team_size = Some(max_team_size);
        self
    }

    /// Looks up a configured teamset by raw id
    pub fn teamset(&self, id: &str) -> Option<&Teamset> {
        self.teamsets.iter().find(|t| t.id.as_str() == id)
    }

    /// Effective team size limit: teamset override, then course default,
    /// `None` meaning unlimited
    pub fn max_team_size_for(&self, id: &TeamsetId) -> Option<u32> {
        self.teamsets
            .iter()
            .find(|t| &t.id == id)
            .and_then(|t| t.max_team_size)
            .or(self.default_max_team_size)
    }

    /// Configured teamset ids in ascending order
    pub fn sorted_teamset_ids(&self) -> Vec<TeamsetId> {
        let mut ids: Vec<TeamsetId> = self.teamsets.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: &str) -> TeamsetId {
        TeamsetId::new(id).unwrap()
    }

    #[test]
    fn teamset_limit_overrides_course_default() {
        let course = CourseContext::new("course-1")
            .with_teamset(Teamset::new(topic("topic_0"), "Zero").with_max_team_size(2))
            .with_teamset(Teamset::new(topic("topic_1"), "One"))
            .with_default_max_team_size(5);

        assert_eq!(course.max_team_size_for(&topic("topic_0")), Some(2));
        assert_eq!(course.max_team_size_for(&topic("topic_1")), Some(5));
    }

    #[test]
    fn no_limit_configured_means_unlimited() {
        let course =
            CourseContext::new("course-1").with_teamset(Teamset::new(topic("topic_0"), "Zero"));

        assert_eq!(course.max_team_size_for(&topic("topic_0")), None);
    }

    #[test]
    fn teamset_lookup_by_raw_id() {
        let course =
            CourseContext::new("course-1").with_teamset(Teamset::new(topic("topic_0"), "Zero"));

        assert!(course.teamset("topic_0").is_some());
        assert!(course.teamset("topic_9").is_none());
    }

    #[test]
    fn sorted_teamset_ids() {
        let course = CourseContext::new("course-1")
            .with_teamset(Teamset::new(topic("b"), "B"))
            .with_teamset(Teamset::new(topic("a"), "A"));

        assert_eq!(course.sorted_teamset_ids(), vec![topic("a"), topic("b")]);
    }

    #[test]
    fn teamset_type_roundtrip_through_storage_string() {
        for kind in [
            TeamsetType::Open,
            TeamsetType::PublicManaged,
            TeamsetType::PrivateManaged,
        ] {
            assert_eq!(TeamsetType::parse(kind.as_str()), kind);
        }
        assert_eq!(TeamsetType::parse("unknown"), TeamsetType::Open);
    }
}
