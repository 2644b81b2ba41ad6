//! Integration tests for roster export

use course_teams::domain::course::{CourseContext, Teamset};
use course_teams::domain::repositories::TeamRepository;
use course_teams::domain::team::{Team, TeamsetId};
use course_teams::domain::user::Email;
use course_teams::infrastructure::InMemoryStore;
use course_teams::roster::{RosterExporter, RosterImporter};
use course_teams::tracking::{DatabaseBackend, TrackerEventEmitter};
use std::sync::Arc;

const COURSE_ID: &str = "course-v1:TestX+CS101+2024";

fn teamset_id(id: &str) -> TeamsetId {
    TeamsetId::new(id).unwrap()
}

fn setup() -> (CourseContext, Arc<InMemoryStore>) {
    // Declared out of order; export sorts teamset columns
    let course = CourseContext::new(COURSE_ID)
        .with_teamset(Teamset::new(teamset_id("topic_b"), "Topic B"))
        .with_teamset(Teamset::new(teamset_id("topic_a"), "Topic A"));
    let store = Arc::new(InMemoryStore::new());
    store.add_course(course.clone());
    (course, store)
}

async fn export_to_string(store: &Arc<InMemoryStore>, course: &CourseContext) -> (usize, String) {
    let exporter = RosterExporter::new(store.clone(), store.clone());
    let mut out = Vec::new();
    let rows = exporter.export(course, &mut out).await.unwrap();
    (rows, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_export_lists_enrolled_learners_with_teams() {
    let (course, store) = setup();
    let alice = store.add_user("alice", Email::new("alice@example.com").unwrap());
    let bob = store.add_user("bob", Email::new("bob@example.com").unwrap());
    let carol = store.add_user("carol", Email::new("carol@example.com").unwrap());
    store.enroll(alice.id, COURSE_ID, "verified");
    store.enroll(bob.id, COURSE_ID, "audit");
    store.enroll_inactive(carol.id, COURSE_ID, "audit");

    let (team, _) = Team::new(
        COURSE_ID.to_string(),
        teamset_id("topic_a"),
        "Red".to_string(),
        "seeded".to_string(),
    )
    .unwrap();
    store.save(&team).await.unwrap();
    store.add_member(&team, alice.id).await.unwrap();

    let (rows, csv) = export_to_string(&store, &course).await;

    assert_eq!(rows, 2);
    assert_eq!(
        csv,
        "user,mode,topic_a,topic_b\nalice,verified,Red,\nbob,audit,,\n"
    );
}

#[tokio::test]
async fn test_export_of_empty_course_is_header_only() {
    let (course, store) = setup();

    let (rows, csv) = export_to_string(&store, &course).await;

    assert_eq!(rows, 0);
    assert_eq!(csv, "user,mode,topic_a,topic_b\n");
}

#[tokio::test]
async fn test_export_reproduces_imported_roster() {
    let (course, store) = setup();
    let alice = store.add_user("alice", Email::new("alice@example.com").unwrap());
    store.enroll(alice.id, COURSE_ID, "audit");

    let csv = "user,mode,topic_a,topic_b\nalice,audit,Red,Blue\n";
    let backend = Arc::new(DatabaseBackend::new("default", store.clone()));
    let emitter = Arc::new(TrackerEventEmitter::new(backend, "localhost"));
    let importer = RosterImporter::new(store.clone(), store.clone(), store.clone(), emitter);
    let result = importer.import_csv(&course, csv.as_bytes()).await.unwrap();
    assert!(result.succeeded);

    let (_, exported) = export_to_string(&store, &course).await;
    assert_eq!(exported, csv);
}
