use super::events::TeamEvent;
use super::value_objects::TeamsetId;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum length of a team name
pub const MAX_TEAM_NAME_LENGTH: usize = 255;

/// Team aggregate root
///
/// A named group of learners inside one teamset of one course.
///
/// # Invariants
/// - Name cannot be empty and is at most 255 characters
/// - Name is unique within `(course_id, teamset_id)` (enforced by the store)
/// - A team never moves between teamsets
///
/// # Example
/// ```
/// use course_teams::domain::team::Team;
/// use course_teams::domain::team::value_objects::TeamsetId;
///
/// let (team, events) = Team::new(
///     "course-v1:Org+CS101+2024".to_string(),
///     TeamsetId::new("topic_0").unwrap(),
///     "Team Blue".to_string(),
///     "Import from csv".to_string(),
/// ).expect("valid team");
///
/// assert_eq!(team.name(), "Team Blue");
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Team {
    id: Uuid,
    course_id: String,
    teamset_id: TeamsetId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new Team aggregate
    ///
    /// # Arguments
    /// * `course_id` - The course this team belongs to
    /// * `teamset_id` - The teamset the team is organized under
    /// * `name` - Team name (see [`Team::validate_name`])
    /// * `description` - Free-form description
    ///
    /// # Returns
    /// * `Ok((Team, Vec<TeamEvent>))` - New team and events generated
    /// * `Err(String)` - If the name is invalid
    pub fn new(
        course_id: String,
        teamset_id: TeamsetId,
        name: String,
        description: String,
    ) -> Result<(Self, Vec<TeamEvent>), String> {
        Self::validate_name(&name)?;

        let team = Self {
            id: Uuid::new_v4(),
            course_id,
            teamset_id,
            name,
            description,
            created_at: Utc::now(),
        };

        let events = vec![TeamEvent::Created {
            team_id: team.id,
            teamset_id: team.teamset_id.clone(),
            name: team.name.clone(),
        }];

        Ok((team, events))
    }

    /// Checks a candidate team name
    ///
    /// # Validation Rules
    /// - Must not be empty after trimming
    /// - At most 255 characters
    pub fn validate_name(name: &str) -> Result<(), String> {
        if name.trim().is_empty() {
            return Err("Team name cannot be empty".to_string());
        }
        if name.chars().count() > MAX_TEAM_NAME_LENGTH {
            return Err(format!(
                "Team name cannot exceed {} characters",
                MAX_TEAM_NAME_LENGTH
            ));
        }
        Ok(())
    }

    // ===== Getters =====

    /// Returns the team's ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the course ID this team belongs to
    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    /// Returns the teamset this team is organized under
    pub fn teamset_id(&self) -> &TeamsetId {
        &self.teamset_id
    }

    /// Returns the team's name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// This method bypasses business rules validation since the data
    /// is already validated and stored in the database.
    ///
    /// # Note
    /// Only to be used by repository implementations for data reconstruction.
    pub fn from_persistence(
        id: Uuid,
        course_id: String,
        teamset_id: TeamsetId,
        name: String,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            course_id,
            teamset_id,
            name,
            description,
            created_at,
        }
    }
}
