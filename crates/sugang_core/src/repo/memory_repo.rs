//! Map-backed registration repository for tests and embedding.
//!
//! # Invariants
//! - A `write` scope works on a staged copy of the state; the copy replaces
//!   the live state only when the closure returns `Ok`.
//! - The `(student_id, course_id)` pair is unique, mirroring the SQLite
//!   constraint.

use super::enrollment_repo::{EnrollmentReader, EnrollmentWriter, RegistrationRepository};
use super::{RepoError, RepoResult};
use crate::model::course::{Course, CourseId, NewCourse};
use crate::model::enrollment::{CourseEnrollmentCount, Enrollment, EnrollmentId};
use crate::model::student::{NewStudent, Student, StudentId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    students: BTreeMap<StudentId, Student>,
    courses: BTreeMap<CourseId, Course>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    last_student_id: StudentId,
    last_course_id: CourseId,
    last_enrollment_id: EnrollmentId,
}

#[derive(Debug, Default)]
struct MemoryStore {
    state: RefCell<MemoryState>,
}

/// In-memory registration repository.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationRepository {
    store: MemoryStore,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one student and returns it with its assigned id.
    pub fn add_student(&mut self, draft: NewStudent) -> RepoResult<Student> {
        draft.validate()?;
        let state = self.store.state.get_mut();
        state.last_student_id += 1;
        let student = Student::from_new(state.last_student_id, draft);
        state.students.insert(student.id, student.clone());
        Ok(student)
    }

    /// Seeds one course and returns it with its assigned id.
    pub fn add_course(&mut self, draft: NewCourse) -> RepoResult<Course> {
        draft.validate()?;
        let state = self.store.state.get_mut();
        state.last_course_id += 1;
        let course = Course::from_new(state.last_course_id, draft);
        state.courses.insert(course.id, course.clone());
        Ok(course)
    }

    /// Returns every stored enrollment ordered by id.
    pub fn enrollments(&self) -> Vec<Enrollment> {
        self.store.state.borrow().enrollments.values().cloned().collect()
    }
}

impl RegistrationRepository for InMemoryRegistrationRepository {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentReader) -> Result<T, E>,
        E: From<RepoError>,
    {
        work(&self.store)
    }

    fn write<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentWriter) -> Result<T, E>,
        E: From<RepoError>,
    {
        let staged = MemoryStore {
            state: RefCell::new(self.store.state.borrow().clone()),
        };
        let output = work(&staged)?;
        self.store = staged;
        Ok(output)
    }
}

impl EnrollmentReader for MemoryStore {
    fn find_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        Ok(self.state.borrow().students.get(&id).cloned())
    }

    fn find_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        Ok(self.state.borrow().courses.get(&id).cloned())
    }

    fn find_enrollment_for_student(
        &self,
        enrollment_id: EnrollmentId,
        student_id: StudentId,
    ) -> RepoResult<Option<Enrollment>> {
        Ok(self
            .state
            .borrow()
            .enrollments
            .get(&enrollment_id)
            .filter(|enrollment| enrollment.is_owned_by(student_id))
            .cloned())
    }

    fn list_enrollments_by_student(&self, student_id: StudentId) -> RepoResult<Vec<Enrollment>> {
        Ok(self
            .state
            .borrow()
            .enrollments
            .values()
            .filter(|enrollment| enrollment.is_owned_by(student_id))
            .cloned()
            .collect())
    }

    fn enrollment_exists(&self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool> {
        Ok(self
            .state
            .borrow()
            .enrollments
            .values()
            .any(|enrollment| {
                enrollment.student_id == student_id && enrollment.course_id == course_id
            }))
    }

    fn count_enrollments_by_course(&self) -> RepoResult<Vec<CourseEnrollmentCount>> {
        let state = self.state.borrow();
        let mut tally: BTreeMap<CourseId, u64> = BTreeMap::new();
        for enrollment in state.enrollments.values() {
            *tally.entry(enrollment.course_id).or_default() += 1;
        }

        tally
            .into_iter()
            .map(|(course_id, count)| {
                let course = state.courses.get(&course_id).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "enrollment references missing course `{course_id}`"
                    ))
                })?;
                Ok(CourseEnrollmentCount {
                    course_id,
                    course_title: course.title.clone(),
                    count,
                })
            })
            .collect()
    }
}

impl EnrollmentWriter for MemoryStore {
    fn insert_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Enrollment> {
        if self.enrollment_exists(student_id, course_id)? {
            return Err(RepoError::Duplicate("enrollments"));
        }

        let mut state = self.state.borrow_mut();
        if !state.students.contains_key(&student_id) {
            return Err(RepoError::NotFound {
                entity: "student",
                id: student_id,
            });
        }
        if !state.courses.contains_key(&course_id) {
            return Err(RepoError::NotFound {
                entity: "course",
                id: course_id,
            });
        }

        state.last_enrollment_id += 1;
        let enrollment = Enrollment {
            id: state.last_enrollment_id,
            student_id,
            course_id,
            created_at: now_epoch_ms(),
        };
        state.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(enrollment)
    }

    fn delete_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        let owned = state
            .enrollments
            .get(&enrollment.id)
            .is_some_and(|stored| stored.is_owned_by(enrollment.student_id));
        if !owned {
            return Err(RepoError::NotFound {
                entity: "enrollment",
                id: enrollment.id,
            });
        }
        state.enrollments.remove(&enrollment.id);
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
