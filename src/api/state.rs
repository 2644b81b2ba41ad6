use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::repositories::{
    CourseRepository, EnrollmentRepository, TeamRepository, TrackingLogRepository,
    UserRepository,
};
use crate::infrastructure::repositories::{
    PostgresCourseRepository, PostgresEnrollmentRepository, PostgresTeamRepository,
    PostgresTrackingLogRepository, PostgresUserRepository,
};
use crate::infrastructure::InMemoryStore;
use crate::roster::{RosterExporter, RosterImporter};
use crate::tracking::{DatabaseBackend, TrackerEventEmitter};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<dyn CourseRepository>,
    pub importer: Arc<RosterImporter>,
    pub exporter: Arc<RosterExporter>,
}

/// Repository set the state is assembled from
pub struct Repositories {
    pub courses: Arc<dyn CourseRepository>,
    pub users: Arc<dyn UserRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub tracking_logs: Arc<dyn TrackingLogRepository>,
}

impl AppState {
    /// Wires the roster services to a set of repositories
    pub fn new(repos: Repositories, config: &Config) -> Self {
        let backend = Arc::new(DatabaseBackend::new(
            config.tracking_backend_name.clone(),
            repos.tracking_logs,
        ));
        let emitter = Arc::new(TrackerEventEmitter::new(backend, config.tracking_host.clone()));

        let importer = RosterImporter::new(
            repos.users,
            repos.enrollments.clone(),
            repos.teams.clone(),
            emitter,
        )
        .with_max_errors(config.roster_max_errors);
        let exporter = RosterExporter::new(repos.enrollments, repos.teams);

        Self {
            courses: repos.courses,
            importer: Arc::new(importer),
            exporter: Arc::new(exporter),
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        let repos = Repositories {
            courses: Arc::new(PostgresCourseRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            enrollments: Arc::new(PostgresEnrollmentRepository::new(pool.clone())),
            teams: Arc::new(PostgresTeamRepository::new(pool.clone())),
            tracking_logs: Arc::new(PostgresTrackingLogRepository::new(pool)),
        };
        Self::new(repos, config)
    }

    /// State backed by a single in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>, config: &Config) -> Self {
        let repos = Repositories {
            courses: store.clone(),
            users: store.clone(),
            enrollments: store.clone(),
            teams: store.clone(),
            tracking_logs: store,
        };
        Self::new(repos, config)
    }
}
