use thiserror::Error;

/// A problem found in a roster, reported back to the uploader
///
/// The `Display` text is the message shown to course staff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterIssue {
    /// Header does not start with the fixed `user` and `mode` columns
    #[error("Column {position} of the header must be '{expected}'.")]
    MissingColumn {
        position: usize,
        expected: &'static str,
    },

    #[error("Teamset with id {0} does not exist.")]
    UnknownTeamset(String),

    #[error("Teamset with id {0} is duplicated.")]
    DuplicateTeamset(String),

    #[error("Username or email {0} does not exist.")]
    UnknownUser(String),

    #[error("User {0} is not enrolled in this course.")]
    NotEnrolled(String),

    #[error("Team name '{name}' on line {line} is invalid: {reason}")]
    InvalidTeamName {
        line: usize,
        name: String,
        reason: String,
    },

    #[error("Team {team} is already full.")]
    TeamFull { team: String },

    #[error("The user {username} is already a member of a team inside teamset {teamset_id} in this course.")]
    AlreadyOnTeamInTeamset {
        username: String,
        teamset_id: String,
    },

    /// Validation was cut short after this many issues
    #[error("Stopped after {0} errors; fix these and upload the file again.")]
    ThresholdExceeded(usize),

    /// The store failed while memberships were being written
    #[error("Saving team memberships failed: {0}")]
    StorageFailure(String),
}

/// Whether processing may go on after recording an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Collects issues for one import run and signals when the cap is reached
#[derive(Debug)]
pub struct IssueLog {
    issues: Vec<RosterIssue>,
    max_errors: usize,
}

impl IssueLog {
    /// `max_errors` below 1 is treated as 1
    pub fn new(max_errors: usize) -> Self {
        Self {
            issues: Vec::new(),
            max_errors: max_errors.max(1),
        }
    }

    /// Records an issue, returning `Flow::Stop` once `max_errors` issues
    /// are held. The stop marker is appended exactly once.
    pub fn record(&mut self, issue: RosterIssue) -> Flow {
        if self.is_capped() {
            return Flow::Stop;
        }
        self.issues.push(issue);
        if self.issues.len() >= self.max_errors {
            self.issues.push(RosterIssue::ThresholdExceeded(self.max_errors));
            return Flow::Stop;
        }
        Flow::Continue
    }

    /// Records the one issue that ends the run, bypassing the cap
    pub fn abort(&mut self, issue: RosterIssue) {
        self.issues.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_capped(&self) -> bool {
        matches!(self.issues.last(), Some(RosterIssue::ThresholdExceeded(_)))
    }

    pub fn into_issues(self) -> Vec<RosterIssue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_upload_feedback() {
        assert_eq!(
            RosterIssue::UnknownTeamset("topic_9".into()).to_string(),
            "Teamset with id topic_9 does not exist."
        );
        assert_eq!(
            RosterIssue::UnknownUser("stranger".into()).to_string(),
            "Username or email stranger does not exist."
        );
        assert_eq!(
            RosterIssue::TeamFull {
                team: "Blue".into()
            }
            .to_string(),
            "Team Blue is already full."
        );
    }

    #[test]
    fn storage_failure_message() {
        assert_eq!(
            RosterIssue::StorageFailure("database error: timeout".into()).to_string(),
            "Saving team memberships failed: database error: timeout"
        );
    }

    #[test]
    fn log_continues_below_threshold() {
        let mut log = IssueLog::new(3);
        assert_eq!(log.record(RosterIssue::UnknownUser("a".into())), Flow::Continue);
        assert_eq!(log.record(RosterIssue::UnknownUser("b".into())), Flow::Continue);
        assert_eq!(log.len(), 2);
        assert!(!log.is_capped());
    }

    #[test]
    fn log_stops_at_threshold_and_marks_it_once() {
        let mut log = IssueLog::new(2);
        log.record(RosterIssue::UnknownUser("a".into()));
        assert_eq!(log.record(RosterIssue::UnknownUser("b".into())), Flow::Stop);
        assert_eq!(log.record(RosterIssue::UnknownUser("c".into())), Flow::Stop);

        let issues = log.into_issues();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[2], RosterIssue::ThresholdExceeded(2));
    }

    #[test]
    fn abort_records_a_single_issue() {
        let mut log = IssueLog::new(1);
        log.abort(RosterIssue::UnknownTeamset("topic_9".into()));

        assert_eq!(log.len(), 1);
        assert!(!log.is_capped());
    }

    #[test]
    fn zero_threshold_behaves_as_one() {
        let mut log = IssueLog::new(0);
        assert_eq!(log.record(RosterIssue::UnknownUser("a".into())), Flow::Stop);
        assert!(log.is_capped());
    }
}
