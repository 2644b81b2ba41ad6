use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::course::CourseContext;
use crate::roster::{ImportResult, RosterError};

async fn load_course(state: &AppState, course_id: &str) -> Result<CourseContext, ApiError> {
    let course = state
        .courses
        .find_by_id(course_id)
        .await?
        .ok_or_else(|| RosterError::CourseNotFound(course_id.to_string()))?;
    Ok(course)
}

/// Assign team memberships from an uploaded roster CSV
///
/// POST /api/courses/:course_id/team-memberships
///
/// Responds 200 when every row was applied, 400 with the same body when the
/// roster was rejected and 500 with it when the store failed part way through
/// writing, so `records_added` is still reported.
pub async fn import_memberships(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportResult>), ApiError> {
    let course = load_course(&state, &course_id).await?;
    let result = state.importer.import_csv(&course, &body).await?;

    let status = if result.succeeded {
        StatusCode::OK
    } else if result.storage_failed() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(result)))
}

/// Download current team memberships as a roster CSV
///
/// GET /api/courses/:course_id/team-memberships
pub async fn export_memberships(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Response, ApiError> {
    let course = load_course(&state, &course_id).await?;

    let mut csv = Vec::new();
    state.exporter.export(&course, &mut csv).await?;

    let disposition = format!(
        "attachment; filename=\"team-membership_{}.csv\"",
        file_safe(&course.course_id)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

fn file_safe(course_id: &str) -> String {
    course_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_ids_become_file_safe() {
        assert_eq!(file_safe("course-v1:Org+CS101+2024"), "course_v1_Org_CS101_2024");
    }
}
