use serde_json::{json, Value};
use uuid::Uuid;

use super::value_objects::{AddMethod, TeamsetId};

/// Domain events that occur within the Team aggregate
///
/// These events represent membership changes worth tracking. They are
/// handed to a `TeamEventEmitter`, which forwards them to the event tracker.
///
/// # Example
/// ```
/// use course_teams::domain::team::events::TeamEvent;
/// use course_teams::domain::team::value_objects::AddMethod;
/// use uuid::Uuid;
///
/// let event = TeamEvent::LearnerAdded {
///     team_id: Uuid::new_v4(),
///     user_id: Uuid::new_v4(),
///     add_method: AddMethod::AddedByAnotherUser,
/// };
/// assert_eq!(event.event_type(), "edx.team.learner_added");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TeamEvent {
    /// Fired when a team is created
    Created {
        /// ID of the newly created team
        team_id: Uuid,
        /// Teamset the team lives in
        teamset_id: TeamsetId,
        /// Team name, unique within the teamset
        name: String,
    },
    /// Fired when a learner joins or is placed on a team
    LearnerAdded {
        team_id: Uuid,
        user_id: Uuid,
        add_method: AddMethod,
    },
}

impl TeamEvent {
    /// Returns the team_id for this event
    pub fn team_id(&self) -> Uuid {
        match self {
            TeamEvent::Created { team_id, .. } => *team_id,
            TeamEvent::LearnerAdded { team_id, .. } => *team_id,
        }
    }

    /// Name under which the event is recorded by the tracker
    pub fn event_type(&self) -> &'static str {
        match self {
            TeamEvent::Created { .. } => "edx.team.created",
            TeamEvent::LearnerAdded { .. } => "edx.team.learner_added",
        }
    }

    /// JSON payload of the event
    pub fn payload(&self) -> Value {
        match self {
            TeamEvent::Created {
                team_id,
                teamset_id,
                name,
            } => json!({
                "team_id": team_id,
                "topic_id": teamset_id.as_str(),
                "name": name,
            }),
            TeamEvent::LearnerAdded {
                team_id,
                user_id,
                add_method,
            } => json!({
                "team_id": team_id,
                "user_id": user_id,
                "add_method": add_method.as_str(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learner_added_payload() {
        let team_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let event = TeamEvent::LearnerAdded {
            team_id,
            user_id,
            add_method: AddMethod::AddedByAnotherUser,
        };

        let payload = event.payload();
        assert_eq!(payload["team_id"], team_id.to_string());
        assert_eq!(payload["user_id"], user_id.to_string());
        assert_eq!(payload["add_method"], "added_by_another_user");
        assert_eq!(event.team_id(), team_id);
    }

    #[test]
    fn created_event_type() {
        let team_id = Uuid::new_v4();
        let event = TeamEvent::Created {
            team_id,
            teamset_id: TeamsetId::new("topic_0").unwrap(),
            name: "Blue".to_string(),
        };

        assert_eq!(event.event_type(), "edx.team.created");
        assert_eq!(event.team_id(), team_id);
        assert_eq!(event.payload()["topic_id"], "topic_0");
    }
}
