//! Course-registration core.
//! Owns the enrollment rules and the storage they run against.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::course::{Course, CourseId, NewCourse};
pub use model::enrollment::{CourseEnrollmentCount, Enrollment, EnrollmentId};
pub use model::student::{NewStudent, Student, StudentId};
pub use model::ValidationError;
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::enrollment_repo::{
    EnrollmentReader, EnrollmentWriter, RegistrationRepository, SqliteRegistrationRepository,
};
pub use repo::memory_repo::InMemoryRegistrationRepository;
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{CatalogError, CatalogService};
pub use service::registration_service::{ErrorKind, RegistrationError, RegistrationService};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
