//! Registration (sugang) use-case service.
//!
//! # Responsibility
//! - Enforce registration rules: parent existence, pair uniqueness, and
//!   owner-scoped cancellation.
//! - Run each use-case as one repository transaction scope.
//!
//! # Invariants
//! - `register` and `cancel` mutate storage only through a `write` scope, so
//!   any rule failure rolls the whole unit back.
//! - Cancelling another student's enrollment is indistinguishable from
//!   cancelling a missing one.
//! - Log lines carry ids and durations only.

use crate::model::course::CourseId;
use crate::model::enrollment::{CourseEnrollmentCount, Enrollment, EnrollmentId};
use crate::model::student::StudentId;
use crate::repo::enrollment_repo::RegistrationRepository;
use crate::repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced student, course, or owned enrollment does not exist.
    NotFound,
    /// Duplicate enrollment attempted.
    Conflict,
    /// Storage failure; not caused by caller input.
    Internal,
}

/// Errors from registration use-cases.
#[derive(Debug)]
pub enum RegistrationError {
    StudentNotFound(StudentId),
    CourseNotFound(CourseId),
    /// No enrollment with this id is owned by this student.
    EnrollmentNotFound {
        student_id: StudentId,
        enrollment_id: EnrollmentId,
    },
    AlreadyEnrolled {
        student_id: StudentId,
        course_id: CourseId,
    },
    Repo(RepoError),
}

impl RegistrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StudentNotFound(_)
            | Self::CourseNotFound(_)
            | Self::EnrollmentNotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyEnrolled { .. } => ErrorKind::Conflict,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::StudentNotFound(_) => "student_not_found",
            Self::CourseNotFound(_) => "course_not_found",
            Self::EnrollmentNotFound { .. } => "enrollment_not_found",
            Self::AlreadyEnrolled { .. } => "already_enrolled",
            Self::Repo(_) => "repo_failure",
        }
    }
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::CourseNotFound(id) => write!(f, "course not found: {id}"),
            Self::EnrollmentNotFound {
                student_id,
                enrollment_id,
            } => write!(
                f,
                "enrollment {enrollment_id} not found for student {student_id}"
            ),
            Self::AlreadyEnrolled {
                student_id,
                course_id,
            } => write!(
                f,
                "student {student_id} is already enrolled in course {course_id}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RegistrationError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Registration service facade over a repository implementation.
pub struct RegistrationService<R: RegistrationRepository> {
    repo: R,
}

impl<R: RegistrationRepository> RegistrationService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Enrolls one student in one course.
    ///
    /// # Errors
    /// - `StudentNotFound` / `CourseNotFound` when a parent is missing.
    /// - `AlreadyEnrolled` when the pair is already registered, including
    ///   when the storage uniqueness constraint catches a concurrent insert.
    pub fn register(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, RegistrationError> {
        let started_at = Instant::now();
        let result = self.repo.write(|store| -> Result<Enrollment, RegistrationError> {
            let student = store
                .find_student(student_id)?
                .ok_or(RegistrationError::StudentNotFound(student_id))?;
            let course = store
                .find_course(course_id)?
                .ok_or(RegistrationError::CourseNotFound(course_id))?;

            let already_enrolled = RegistrationError::AlreadyEnrolled {
                student_id: student.id,
                course_id: course.id,
            };
            if store.enrollment_exists(student.id, course.id)? {
                return Err(already_enrolled);
            }

            match store.insert_enrollment(student.id, course.id) {
                Ok(enrollment) => Ok(enrollment),
                Err(RepoError::Duplicate(_)) => Err(already_enrolled),
                Err(err) => Err(err.into()),
            }
        });

        match &result {
            Ok(enrollment) => info!(
                "event=enrollment_register module=service status=ok student_id={} course_id={} enrollment_id={} duration_ms={}",
                student_id,
                course_id,
                enrollment.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("enrollment_register", student_id, started_at, err),
        }
        result
    }

    /// Lists every enrollment owned by `student_id`, in storage order.
    ///
    /// Unknown students yield an empty list.
    pub fn list_by_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, RegistrationError> {
        self.repo
            .read(|store| Ok(store.list_enrollments_by_student(student_id)?))
    }

    /// Permanently deletes one enrollment owned by `student_id`.
    pub fn cancel(
        &mut self,
        student_id: StudentId,
        enrollment_id: EnrollmentId,
    ) -> Result<(), RegistrationError> {
        let started_at = Instant::now();
        let not_found = || RegistrationError::EnrollmentNotFound {
            student_id,
            enrollment_id,
        };
        let result = self.repo.write(|store| -> Result<(), RegistrationError> {
            let enrollment = store
                .find_enrollment_for_student(enrollment_id, student_id)?
                .ok_or_else(not_found)?;
            match store.delete_enrollment(&enrollment) {
                Ok(()) => Ok(()),
                Err(RepoError::NotFound { .. }) => Err(not_found()),
                Err(err) => Err(err.into()),
            }
        });

        match &result {
            Ok(()) => info!(
                "event=enrollment_cancel module=service status=ok student_id={} enrollment_id={} duration_ms={}",
                student_id,
                enrollment_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("enrollment_cancel", student_id, started_at, err),
        }
        result
    }

    /// Returns enrollment counts grouped by course, ordered by course id.
    ///
    /// Courses with zero enrollments are not listed.
    pub fn count_by_course(&self) -> Result<Vec<CourseEnrollmentCount>, RegistrationError> {
        self.repo
            .read(|store| Ok(store.count_enrollments_by_course()?))
    }

    /// Consumes the service and returns the underlying repository.
    pub fn into_repository(self) -> R {
        self.repo
    }
}

fn log_failure(event: &str, student_id: StudentId, started_at: Instant, err: &RegistrationError) {
    let duration_ms = started_at.elapsed().as_millis();
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::Conflict => warn!(
            "event={} module=service status=rejected student_id={} duration_ms={} error_code={}",
            event,
            student_id,
            duration_ms,
            err.code()
        ),
        ErrorKind::Internal => error!(
            "event={} module=service status=error student_id={} duration_ms={} error_code={} error={}",
            event,
            student_id,
            duration_ms,
            err.code(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, RegistrationError};
    use crate::repo::RepoError;

    #[test]
    fn error_kinds_collapse_to_not_found_and_conflict() {
        assert_eq!(
            RegistrationError::StudentNotFound(1).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RegistrationError::EnrollmentNotFound {
                student_id: 1,
                enrollment_id: 2
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RegistrationError::AlreadyEnrolled {
                student_id: 1,
                course_id: 2
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            RegistrationError::Repo(RepoError::InvalidData("x".to_string())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn enrollment_not_found_message_names_owner() {
        let err = RegistrationError::EnrollmentNotFound {
            student_id: 7,
            enrollment_id: 42,
        };
        assert_eq!(err.to_string(), "enrollment 42 not found for student 7");
    }
}
