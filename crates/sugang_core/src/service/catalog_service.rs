//! Catalog use-case service for students and courses.
//!
//! # Responsibility
//! - Create the parent records that registration links together.
//! - Normalize administrative input before it reaches storage.
//!
//! # Invariants
//! - Names, majors, and titles are trimmed and never blank.

use crate::model::course::{Course, CourseId, NewCourse};
use crate::model::student::{NewStudent, Student, StudentId};
use crate::model::ValidationError;
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from catalog use-cases.
#[derive(Debug)]
pub enum CatalogError {
    /// Input rejected by model validation.
    Invalid(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "invalid input: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

/// Catalog service facade.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a student record from name and major.
    pub fn add_student(
        &self,
        name: impl Into<String>,
        major: impl Into<String>,
    ) -> Result<Student, CatalogError> {
        let draft = NewStudent::new(name, major);
        draft.validate()?;
        let student = self.repo.create_student(&draft)?;
        info!(
            "event=student_create module=service status=ok student_id={}",
            student.id
        );
        Ok(student)
    }

    /// Registers a course record from its title.
    pub fn add_course(&self, title: impl Into<String>) -> Result<Course, CatalogError> {
        let draft = NewCourse::new(title);
        draft.validate()?;
        let course = self.repo.create_course(&draft)?;
        info!(
            "event=course_create module=service status=ok course_id={}",
            course.id
        );
        Ok(course)
    }

    pub fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.repo.get_student(id)
    }

    pub fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        self.repo.get_course(id)
    }

    /// Lists all students ordered by id.
    pub fn list_students(&self) -> RepoResult<Vec<Student>> {
        self.repo.list_students()
    }

    /// Lists all courses ordered by id.
    pub fn list_courses(&self) -> RepoResult<Vec<Course>> {
        self.repo.list_courses()
    }
}
