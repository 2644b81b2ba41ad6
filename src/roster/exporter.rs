//! Team membership export.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use uuid::Uuid;

use super::errors::{RosterError, RosterResult};
use crate::domain::course::CourseContext;
use crate::domain::repositories::{EnrollmentRepository, TeamRepository};
use crate::domain::team::TeamsetId;

/// Writes the current team membership of a course as a roster CSV.
///
/// The output has the same layout the importer reads, so an exported file
/// can be edited and uploaded again.
pub struct RosterExporter {
    enrollments: Arc<dyn EnrollmentRepository>,
    teams: Arc<dyn TeamRepository>,
}

impl RosterExporter {
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        teams: Arc<dyn TeamRepository>,
    ) -> Self {
        Self { enrollments, teams }
    }

    /// Writes header `user,mode,<teamset ids sorted>` and one line per
    /// enrolled learner, row by row into `sink`.
    ///
    /// Returns the number of learner rows written.
    pub async fn export<W: Write>(&self, course: &CourseContext, sink: W) -> RosterResult<usize> {
        let teamset_ids = course.sorted_teamset_ids();
        let enrollments = self.enrollments.list_enrolled(&course.course_id).await?;
        let memberships = self.teams.memberships_for_course(&course.course_id).await?;

        let mut team_by_user: HashMap<(Uuid, TeamsetId), String> = HashMap::new();
        for membership in memberships {
            team_by_user.insert(
                (membership.user_id, membership.teamset_id),
                membership.team_name,
            );
        }

        let mut writer = csv::Writer::from_writer(sink);

        let mut header = vec!["user".to_string(), "mode".to_string()];
        header.extend(teamset_ids.iter().map(ToString::to_string));
        writer.write_record(&header).map_err(write_error)?;

        for enrollment in &enrollments {
            let mut record = vec![enrollment.username.clone(), enrollment.mode.clone()];
            for teamset_id in &teamset_ids {
                let team = team_by_user
                    .get(&(enrollment.user_id, teamset_id.clone()))
                    .cloned()
                    .unwrap_or_default();
                record.push(team);
            }
            writer.write_record(&record).map_err(write_error)?;
        }

        writer.flush().map_err(|e| RosterError::Write(e.to_string()))?;

        tracing::info!(
            course_id = %course.course_id,
            rows = enrollments.len(),
            "Exported team membership"
        );
        Ok(enrollments.len())
    }
}

fn write_error(err: csv::Error) -> RosterError {
    RosterError::Write(err.to_string())
}
