//! End-to-end API integration tests
//!
//! These tests drive the router with in-memory state and verify:
//! - Health check
//! - Roster upload responses (200 / 400 / 404)
//! - Roster download headers and body

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use course_teams::api::{self, AppState, Repositories};
use course_teams::config::Config;
use course_teams::domain::course::{CourseContext, Teamset};
use course_teams::domain::repositories::{
    Membership, RepositoryError, RepositoryResult, TeamRepository,
};
use course_teams::domain::team::{Team, TeamsetId};
use course_teams::domain::user::Email;
use course_teams::infrastructure::InMemoryStore;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tower::util::ServiceExt; // for oneshot
use uuid::Uuid;

const COURSE_ID: &str = "course-v1:TestX+CS101+2024";

/// Setup test store with one course and one enrolled learner
fn setup_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.add_course(
        CourseContext::new(COURSE_ID).with_teamset(
            Teamset::new(TeamsetId::new("topic_0").unwrap(), "Topic 0").with_max_team_size(5),
        ),
    );
    let alice = store.add_user("alice", Email::new("alice@example.com").unwrap());
    store.enroll(alice.id, COURSE_ID, "audit");
    store
}

/// Setup test application backed by an in-memory store
fn setup_app() -> (Router, Arc<InMemoryStore>) {
    let store = setup_store();
    let config = Config::from_lookup(|_| None).unwrap();
    let app = api::router(AppState::in_memory(store.clone(), &config));
    (app, store)
}

/// Team store that refuses to save new teams
struct UnwritableTeams {
    inner: Arc<InMemoryStore>,
}

#[async_trait]
impl TeamRepository for UnwritableTeams {
    async fn save(&self, _team: &Team) -> RepositoryResult<()> {
        Err(RepositoryError::Database("disk full".to_string()))
    }

    async fn find_by_name(
        &self,
        course_id: &str,
        teamset_id: &TeamsetId,
        name: &str,
    ) -> RepositoryResult<Option<Team>> {
        self.inner.find_by_name(course_id, teamset_id, name).await
    }

    async fn member_count(&self, team_id: Uuid) -> RepositoryResult<usize> {
        self.inner.member_count(team_id).await
    }

    async fn member_ids_in_teamset(
        &self,
        course_id: &str,
        teamset_id: &TeamsetId,
    ) -> RepositoryResult<HashSet<Uuid>> {
        self.inner.member_ids_in_teamset(course_id, teamset_id).await
    }

    async fn add_member(&self, team: &Team, user_id: Uuid) -> RepositoryResult<()> {
        self.inner.add_member(team, user_id).await
    }

    async fn memberships_for_course(&self, course_id: &str) -> RepositoryResult<Vec<Membership>> {
        self.inner.memberships_for_course(course_id).await
    }
}

fn memberships_uri(course_id: &str) -> String {
    format!("/api/courses/{}/team-memberships", course_id)
}

fn upload(course_id: &str, csv: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(memberships_uri(course_id))
        .header("content-type", "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn test_upload_success() {
    let (app, store) = setup_app();

    let response = app
        .oneshot(upload(COURSE_ID, "user,mode,topic_0\nalice,audit,teamA\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["succeeded"], true);
    assert_eq!(json["records_added"], 1);
    assert_eq!(json["errors"], serde_json::json!([]));
    assert_eq!(store.membership_count(), 1);
}

#[tokio::test]
async fn test_upload_with_errors_returns_bad_request() {
    let (app, store) = setup_app();

    let response = app
        .oneshot(upload(COURSE_ID, "user,mode,topic_0\nnobody,audit,teamA\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["succeeded"], false);
    assert_eq!(
        json["errors"][0],
        "Username or email nobody does not exist."
    );
    assert_eq!(store.membership_count(), 0);
}

#[tokio::test]
async fn test_upload_storage_failure_returns_result_with_server_error() {
    let store = setup_store();
    let repos = Repositories {
        courses: store.clone(),
        users: store.clone(),
        enrollments: store.clone(),
        teams: Arc::new(UnwritableTeams {
            inner: store.clone(),
        }),
        tracking_logs: store.clone(),
    };
    let config = Config::from_lookup(|_| None).unwrap();
    let app = api::router(AppState::new(repos, &config));

    let response = app
        .oneshot(upload(COURSE_ID, "user,mode,topic_0\nalice,audit,teamA\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["succeeded"], false);
    assert_eq!(json["records_added"], 0);
    assert_eq!(
        json["errors"][0],
        "Saving team memberships failed: database error: disk full"
    );
    assert_eq!(store.membership_count(), 0);
}

#[tokio::test]
async fn test_upload_empty_file_returns_bad_request() {
    let (app, _) = setup_app();

    let response = app.oneshot(upload(COURSE_ID, "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_upload_unknown_course_returns_not_found() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(upload("course-v1:Nope+0+0", "user,mode\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_roster() {
    let (app, _) = setup_app();

    let response = app
        .clone()
        .oneshot(upload(COURSE_ID, "user,mode,topic_0\nalice,audit,teamA\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(memberships_uri(COURSE_ID))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"team-membership_course_v1_TestX_CS101_2024.csv\""
    );
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body, "user,mode,topic_0\nalice,audit,teamA\n");
}

#[tokio::test]
async fn test_download_unknown_course_returns_not_found() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri(memberships_uri("missing"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
