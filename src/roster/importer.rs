//! Team membership import.
//!
//! An import validates the whole roster first and writes nothing unless every
//! row is clean. Validation works against a snapshot of existing memberships
//! taken when the header is checked, kept per teamset and updated in memory
//! as rows are accepted.

use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use super::errors::RosterResult;
use super::issues::{Flow, IssueLog, RosterIssue};
use super::table::RosterTable;
use crate::domain::course::CourseContext;
use crate::domain::repositories::{
    EnrollmentRepository, RepositoryError, TeamRepository, User, UserRepository,
};
use crate::domain::team::{AddMethod, Team, TeamEvent, TeamsetId};
use crate::domain::user::Email;
use crate::tracking::TeamEventEmitter;

/// Default cap on collected issues before validation stops.
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Description given to teams created by an import.
pub const IMPORT_TEAM_DESCRIPTION: &str = "Import from csv";

/// Outcome of an import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    pub succeeded: bool,
    #[serde(serialize_with = "issue_messages")]
    pub errors: Vec<RosterIssue>,
    /// Memberships actually written.
    pub records_added: usize,
}

impl ImportResult {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Whether writing was cut short by the store rather than by the roster
    pub fn storage_failed(&self) -> bool {
        self.errors
            .iter()
            .any(|issue| matches!(issue, RosterIssue::StorageFailure(_)))
    }
}

#[allow(clippy::ptr_arg)]
fn issue_messages<S: Serializer>(
    issues: &Vec<RosterIssue>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(issues.iter().map(ToString::to_string))
}

/// Assigns learners to teams from a roster.
pub struct RosterImporter {
    users: Arc<dyn UserRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    teams: Arc<dyn TeamRepository>,
    events: Arc<dyn TeamEventEmitter>,
    max_errors: usize,
}

impl RosterImporter {
    pub fn new(
        users: Arc<dyn UserRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        teams: Arc<dyn TeamRepository>,
        events: Arc<dyn TeamEventEmitter>,
    ) -> Self {
        Self {
            users,
            enrollments,
            teams,
            events,
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }

    /// Caps the number of issues collected before validation stops
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors.max(1);
        self
    }

    /// Parses raw CSV bytes and imports them.
    pub async fn import_csv(
        &self,
        course: &CourseContext,
        data: &[u8],
    ) -> RosterResult<ImportResult> {
        let table = RosterTable::parse(data)?;
        self.import(course, &table).await
    }

    /// Validates the roster and, if it is clean, writes every assignment.
    ///
    /// Content problems are returned as issues in the result, as is a storage
    /// failure once writing has started. `Err` is reserved for storage
    /// failures during validation, before anything is written.
    pub async fn import(
        &self,
        course: &CourseContext,
        table: &RosterTable,
    ) -> RosterResult<ImportResult> {
        tracing::info!(
            course_id = %course.course_id,
            rows = table.rows.len(),
            "Starting team membership import"
        );

        let mut run = ImportRun::new(self, course);

        if let Some(teamset_ids) = run.validate_header(table).await? {
            run.validate_rows(table, &teamset_ids).await?;
            if run.issues.is_empty() {
                run.commit().await;
            }
        }

        let result = run.finish();
        if result.succeeded {
            tracing::info!(
                course_id = %course.course_id,
                records_added = result.records_added,
                "Team membership import succeeded"
            );
        } else {
            tracing::warn!(
                course_id = %course.course_id,
                errors = result.errors.len(),
                records_added = result.records_added,
                "Team membership import failed"
            );
        }
        Ok(result)
    }
}

type TeamKey = (TeamsetId, String);

/// A validated, not yet written membership.
struct Assignment {
    line: usize,
    user: User,
    teamset_id: TeamsetId,
    team_name: String,
}

/// State of one import; never shared between runs.
struct ImportRun<'a> {
    importer: &'a RosterImporter,
    course: &'a CourseContext,
    issues: IssueLog,
    /// Users holding or about to hold a seat, per teamset.
    members_by_teamset: HashMap<TeamsetId, HashSet<Uuid>>,
    /// Store lookups by `(teamset, name)`; `None` means no such team yet.
    teams: HashMap<TeamKey, Option<Team>>,
    stored_counts: HashMap<Uuid, usize>,
    pending_counts: HashMap<TeamKey, usize>,
    assignments: Vec<Assignment>,
    records_added: usize,
}

impl<'a> ImportRun<'a> {
    fn new(importer: &'a RosterImporter, course: &'a CourseContext) -> Self {
        Self {
            importer,
            course,
            issues: IssueLog::new(importer.max_errors),
            members_by_teamset: HashMap::new(),
            teams: HashMap::new(),
            stored_counts: HashMap::new(),
            pending_counts: HashMap::new(),
            assignments: Vec::new(),
            records_added: 0,
        }
    }

    /// Checks the header and seeds the membership index.
    ///
    /// Returns the teamset ids in column order, or `None` after recording the
    /// single issue that aborts the import.
    async fn validate_header(
        &mut self,
        table: &RosterTable,
    ) -> RosterResult<Option<Vec<TeamsetId>>> {
        for (idx, expected) in ["user", "mode"].into_iter().enumerate() {
            let matches = table
                .header
                .get(idx)
                .is_some_and(|cell| cell.eq_ignore_ascii_case(expected));
            if !matches {
                self.issues.abort(RosterIssue::MissingColumn {
                    position: idx + 1,
                    expected,
                });
                return Ok(None);
            }
        }

        let mut seen = HashSet::new();
        let mut teamset_ids = Vec::new();
        for column in table.teamset_columns() {
            if !seen.insert(column.as_str()) {
                self.issues
                    .abort(RosterIssue::DuplicateTeamset(column.clone()));
                return Ok(None);
            }
            match self.course.teamset(column) {
                Some(teamset) => teamset_ids.push(teamset.id.clone()),
                None => {
                    self.issues
                        .abort(RosterIssue::UnknownTeamset(column.clone()));
                    return Ok(None);
                }
            }
        }

        for teamset_id in &teamset_ids {
            let members = self
                .importer
                .teams
                .member_ids_in_teamset(&self.course.course_id, teamset_id)
                .await?;
            self.members_by_teamset.insert(teamset_id.clone(), members);
        }

        Ok(Some(teamset_ids))
    }

    async fn validate_rows(
        &mut self,
        table: &RosterTable,
        teamset_ids: &[TeamsetId],
    ) -> RosterResult<()> {
        'rows: for row in &table.rows {
            if row.user.is_empty() {
                continue;
            }

            let Some(user) = self.resolve_user(&row.user).await? else {
                tracing::warn!(line = row.line, token = %row.user, "Roster user not found");
                let issue = RosterIssue::UnknownUser(row.user.clone());
                if self.issues.record(issue) == Flow::Stop {
                    break;
                }
                continue;
            };

            let enrolled = self
                .importer
                .enrollments
                .is_enrolled(user.id, &self.course.course_id)
                .await?;
            if !enrolled {
                tracing::warn!(
                    line = row.line,
                    username = %user.username,
                    "Roster user not enrolled"
                );
                let issue = RosterIssue::NotEnrolled(user.username.clone());
                if self.issues.record(issue) == Flow::Stop {
                    break;
                }
                continue;
            }

            for (column, teamset_id) in teamset_ids.iter().enumerate() {
                let Some(team_name) = row.team_at(column) else {
                    continue;
                };
                let flow = self
                    .validate_cell(&user, teamset_id, team_name, row.line)
                    .await?;
                if flow == Flow::Stop {
                    break 'rows;
                }
            }
        }
        Ok(())
    }

    /// Username first, then email. Deactivated accounts do not resolve.
    async fn resolve_user(&self, token: &str) -> RosterResult<Option<User>> {
        let users = &self.importer.users;
        let user = match users.find_by_username(token).await? {
            Some(user) => Some(user),
            None => match Email::new(token) {
                Ok(email) => users.find_by_email(&email).await?,
                Err(_) => None,
            },
        };
        Ok(user.filter(|u| u.is_active))
    }

    async fn validate_cell(
        &mut self,
        user: &User,
        teamset_id: &TeamsetId,
        team_name: &str,
        line: usize,
    ) -> RosterResult<Flow> {
        tracing::debug!(
            line,
            username = %user.username,
            teamset_id = %teamset_id,
            team_name,
            "Validating assignment"
        );

        if let Err(reason) = Team::validate_name(team_name) {
            return Ok(self.issues.record(RosterIssue::InvalidTeamName {
                line,
                name: team_name.to_string(),
                reason,
            }));
        }

        let key = (teamset_id.clone(), team_name.to_string());
        let stored = match self.lookup_team(&key).await? {
            Some(team_id) => self.stored_member_count(team_id).await?,
            None => 0,
        };
        let pending = self.pending_counts.get(&key).copied().unwrap_or(0);
        let mut accepted = true;

        if let Some(limit) = self.course.max_team_size_for(teamset_id) {
            if stored + pending >= limit as usize {
                accepted = false;
                let flow = self.issues.record(RosterIssue::TeamFull {
                    team: team_name.to_string(),
                });
                if flow == Flow::Stop {
                    return Ok(flow);
                }
            }
        }

        let already_placed = self
            .members_by_teamset
            .get(teamset_id)
            .is_some_and(|members| members.contains(&user.id));
        if already_placed {
            accepted = false;
            let flow = self.issues.record(RosterIssue::AlreadyOnTeamInTeamset {
                username: user.username.clone(),
                teamset_id: teamset_id.to_string(),
            });
            if flow == Flow::Stop {
                return Ok(flow);
            }
        }

        if accepted {
            self.members_by_teamset
                .entry(teamset_id.clone())
                .or_default()
                .insert(user.id);
            *self.pending_counts.entry(key).or_insert(0) += 1;
            self.assignments.push(Assignment {
                line,
                user: user.clone(),
                teamset_id: teamset_id.clone(),
                team_name: team_name.to_string(),
            });
        }
        Ok(Flow::Continue)
    }

    /// Looks a team up once per run, returning its id if it exists.
    async fn lookup_team(&mut self, key: &TeamKey) -> RosterResult<Option<Uuid>> {
        if let Some(cached) = self.teams.get(key) {
            return Ok(cached.as_ref().map(Team::id));
        }
        let team = self
            .importer
            .teams
            .find_by_name(&self.course.course_id, &key.0, &key.1)
            .await?;
        let id = team.as_ref().map(Team::id);
        self.teams.insert(key.clone(), team);
        Ok(id)
    }

    async fn stored_member_count(&mut self, team_id: Uuid) -> RosterResult<usize> {
        if let Some(count) = self.stored_counts.get(&team_id) {
            return Ok(*count);
        }
        let count = self.importer.teams.member_count(team_id).await?;
        self.stored_counts.insert(team_id, count);
        Ok(count)
    }

    /// Writes every validated assignment, creating teams on first use.
    ///
    /// A membership rejected by the store is recorded and the remaining
    /// assignments are still written, until the issue cap is reached. Any
    /// other storage failure is recorded and ends the commit; whatever was
    /// written before it stays counted in `records_added`.
    async fn commit(&mut self) {
        let course_id = self.course.course_id.clone();
        let assignments = std::mem::take(&mut self.assignments);

        for assignment in assignments {
            let team = match self.team_for(&assignment).await {
                Ok(Some(team)) => team,
                Ok(None) => {
                    if self.issues.is_capped() {
                        break;
                    }
                    continue;
                }
                Err(e) => {
                    self.storage_failure(e);
                    break;
                }
            };

            match self.importer.teams.add_member(&team, assignment.user.id).await {
                Ok(()) => {
                    let event = TeamEvent::LearnerAdded {
                        team_id: team.id(),
                        user_id: assignment.user.id,
                        add_method: AddMethod::AddedByAnotherUser,
                    };
                    self.importer.events.emit(&course_id, &event).await;
                    self.records_added += 1;
                }
                Err(RepositoryError::AlreadyOnTeamInTeamset { .. }) => {
                    tracing::warn!(
                        username = %assignment.user.username,
                        teamset_id = %assignment.teamset_id,
                        "Membership conflict while committing roster"
                    );
                    let issue = RosterIssue::AlreadyOnTeamInTeamset {
                        username: assignment.user.username.clone(),
                        teamset_id: assignment.teamset_id.to_string(),
                    };
                    if self.issues.record(issue) == Flow::Stop {
                        break;
                    }
                }
                Err(e) => {
                    self.storage_failure(e);
                    break;
                }
            }
        }
    }

    /// Team an assignment goes to, created and saved on first use.
    ///
    /// `None` means the team could not be created and the issue is recorded.
    async fn team_for(
        &mut self,
        assignment: &Assignment,
    ) -> Result<Option<Team>, RepositoryError> {
        let key = (assignment.teamset_id.clone(), assignment.team_name.clone());
        if let Some(team) = self.teams.get(&key).cloned().flatten() {
            return Ok(Some(team));
        }

        let created = Team::new(
            self.course.course_id.clone(),
            assignment.teamset_id.clone(),
            assignment.team_name.clone(),
            IMPORT_TEAM_DESCRIPTION.to_string(),
        );
        let (team, events) = match created {
            Ok(created) => created,
            Err(reason) => {
                self.issues.record(RosterIssue::InvalidTeamName {
                    line: assignment.line,
                    name: assignment.team_name.clone(),
                    reason,
                });
                return Ok(None);
            }
        };

        self.importer.teams.save(&team).await?;
        tracing::info!(
            course_id = %self.course.course_id,
            teamset_id = %team.teamset_id(),
            team_id = %team.id(),
            name = team.name(),
            "Created team from roster"
        );
        for event in &events {
            self.importer.events.emit(&self.course.course_id, event).await;
        }
        self.teams.insert(key, Some(team.clone()));
        Ok(Some(team))
    }

    fn storage_failure(&mut self, err: RepositoryError) {
        tracing::error!(
            course_id = %self.course.course_id,
            records_added = self.records_added,
            error = %err,
            "Storage failure while committing roster"
        );
        self.issues.abort(RosterIssue::StorageFailure(err.to_string()));
    }

    fn finish(self) -> ImportResult {
        let errors = self.issues.into_issues();
        ImportResult {
            succeeded: errors.is_empty(),
            errors,
            records_added: self.records_added,
        }
    }
}
