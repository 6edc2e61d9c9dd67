//! Enrollment (sugang) record and aggregate read model.
//!
//! # Invariants
//! - One enrollment links exactly one student to exactly one course.
//! - The `(student_id, course_id)` pair is unique across stored rows.
//! - Enrollments are created and deleted, never updated.

use super::course::CourseId;
use super::student::StudentId;
use serde::{Deserialize, Serialize};

/// Storage-assigned enrollment identifier.
pub type EnrollmentId = i64;

/// One registration of a student in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
}

impl Enrollment {
    /// Returns whether `student_id` owns this enrollment.
    pub fn is_owned_by(&self, student_id: StudentId) -> bool {
        self.student_id == student_id
    }
}

/// Grouped enrollment tally for one course.
///
/// Courses without enrollments produce no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEnrollmentCount {
    pub course_id: CourseId,
    pub course_title: String,
    pub count: u64,
}
