use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a teamset inside a course's teams configuration
///
/// # Invariants
/// - Cannot be empty or whitespace
/// - Stored trimmed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamsetId(String);

impl TeamsetId {
    /// Creates a new TeamsetId
    ///
    /// # Example
    /// ```
    /// use course_teams::domain::team::value_objects::TeamsetId;
    ///
    /// let id = TeamsetId::new(" topic_0 ").expect("valid teamset id");
    /// assert_eq!(id.as_str(), "topic_0");
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Teamset id cannot be empty".to_string());
        }
        Ok(TeamsetId(trimmed.to_string()))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a learner ended up on a team, recorded on `learner_added` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddMethod {
    /// Placed on the team by staff (CSV import, admin tools)
    AddedByAnotherUser,
}

impl AddMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddMethod::AddedByAnotherUser => "added_by_another_user",
        }
    }
}

impl fmt::Display for AddMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
