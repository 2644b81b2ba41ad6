// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod postgres_course_repository;
pub mod postgres_enrollment_repository;
pub mod postgres_team_repository;
pub mod postgres_tracking_log_repository;
pub mod postgres_user_repository;

pub use postgres_course_repository::PostgresCourseRepository;
pub use postgres_enrollment_repository::PostgresEnrollmentRepository;
pub use postgres_team_repository::PostgresTeamRepository;
pub use postgres_tracking_log_repository::PostgresTrackingLogRepository;
pub use postgres_user_repository::PostgresUserRepository;
