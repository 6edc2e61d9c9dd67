//! Enrollment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Expose the lookups and writes the registration rules are built from.
//! - Own transaction scoping: every unit of work runs inside `read` or
//!   `write`, and only a successful closure commits.
//!
//! # Invariants
//! - `write` scopes hold an `IMMEDIATE` SQLite transaction, so the
//!   check-then-write sequence of one caller cannot interleave with another
//!   writer.
//! - Any error returned from a scope drops the transaction, which rolls back.
//! - `UNIQUE(student_id, course_id)` violations surface as
//!   `RepoError::Duplicate("enrollments")`.

use super::catalog_repo::{load_course, load_student, COURSES_TABLE, STUDENTS_TABLE};
use super::{ensure_connection_ready, RepoError, RepoResult, RequiredTable};
use crate::db::DbError;
use crate::model::course::{Course, CourseId};
use crate::model::enrollment::{CourseEnrollmentCount, Enrollment, EnrollmentId};
use crate::model::student::{Student, StudentId};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

pub(crate) const ENROLLMENTS_TABLE: RequiredTable = (
    "enrollments",
    &["id", "student_id", "course_id", "created_at"],
);

const ENROLLMENT_SELECT_SQL: &str = "SELECT
    id,
    student_id,
    course_id,
    created_at
FROM enrollments";

/// Read operations available inside any transaction scope.
pub trait EnrollmentReader {
    fn find_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn find_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    /// Looks up one enrollment by id, scoped to its owning student.
    ///
    /// Returns `None` both when the id is unknown and when it belongs to
    /// another student.
    fn find_enrollment_for_student(
        &self,
        enrollment_id: EnrollmentId,
        student_id: StudentId,
    ) -> RepoResult<Option<Enrollment>>;
    fn list_enrollments_by_student(&self, student_id: StudentId) -> RepoResult<Vec<Enrollment>>;
    fn enrollment_exists(&self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool>;
    /// Grouped count per course. Courses with no enrollments are omitted.
    fn count_enrollments_by_course(&self) -> RepoResult<Vec<CourseEnrollmentCount>>;
}

/// Write operations, only reachable inside a `write` scope.
pub trait EnrollmentWriter: EnrollmentReader {
    fn insert_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Enrollment>;
    fn delete_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()>;
}

/// Storage boundary for registration use-cases.
pub trait RegistrationRepository {
    /// Runs `work` inside a non-exclusive read transaction.
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentReader) -> Result<T, E>,
        E: From<RepoError>;

    /// Runs `work` inside a write transaction.
    ///
    /// Commits only when `work` returns `Ok`; every other exit rolls back.
    fn write<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentWriter) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed registration repository.
pub struct SqliteRegistrationRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRegistrationRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[STUDENTS_TABLE, COURSES_TABLE, ENROLLMENTS_TABLE])?;
        Ok(Self { conn })
    }
}

impl RegistrationRepository for SqliteRegistrationRepository<'_> {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentReader) -> Result<T, E>,
        E: From<RepoError>,
    {
        // Deferred: takes a shared lock on first read, never blocks readers.
        let tx = self.conn.unchecked_transaction().map_err(RepoError::from)?;
        let store = SqliteEnrollmentStore { conn: &tx };
        let output = work(&store)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(output)
    }

    fn write<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentWriter) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let store = SqliteEnrollmentStore { conn: &tx };
        let output = work(&store)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(output)
    }
}

/// Statement executor bound to one open transaction.
struct SqliteEnrollmentStore<'tx> {
    conn: &'tx Connection,
}

impl EnrollmentReader for SqliteEnrollmentStore<'_> {
    fn find_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        load_student(self.conn, id)
    }

    fn find_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        load_course(self.conn, id)
    }

    fn find_enrollment_for_student(
        &self,
        enrollment_id: EnrollmentId,
        student_id: StudentId,
    ) -> RepoResult<Option<Enrollment>> {
        let enrollment = self
            .conn
            .query_row(
                &format!("{ENROLLMENT_SELECT_SQL} WHERE id = ?1 AND student_id = ?2;"),
                params![enrollment_id, student_id],
                |row| parse_enrollment_row(row),
            )
            .optional()?;
        Ok(enrollment)
    }

    fn list_enrollments_by_student(&self, student_id: StudentId) -> RepoResult<Vec<Enrollment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENROLLMENT_SELECT_SQL} WHERE student_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([student_id])?;
        let mut enrollments = Vec::new();
        while let Some(row) = rows.next()? {
            enrollments.push(parse_enrollment_row(row)?);
        }
        Ok(enrollments)
    }

    fn enrollment_exists(&self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM enrollments
                WHERE student_id = ?1 AND course_id = ?2
            );",
            params![student_id, course_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count_enrollments_by_course(&self) -> RepoResult<Vec<CourseEnrollmentCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                c.id AS course_id,
                c.title AS course_title,
                COUNT(e.id) AS enrollment_count
             FROM enrollments e
             INNER JOIN courses c ON c.id = e.course_id
             GROUP BY c.id, c.title
             ORDER BY c.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            let raw_count: i64 = row.get("enrollment_count")?;
            let count = u64::try_from(raw_count).map_err(|_| {
                RepoError::InvalidData(format!("negative enrollment count `{raw_count}`"))
            })?;
            counts.push(CourseEnrollmentCount {
                course_id: row.get("course_id")?,
                course_title: row.get("course_title")?,
                count,
            });
        }
        Ok(counts)
    }
}

impl EnrollmentWriter for SqliteEnrollmentStore<'_> {
    fn insert_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Enrollment> {
        let enrollment = self
            .conn
            .query_row(
                "INSERT INTO enrollments (student_id, course_id)
                 VALUES (?1, ?2)
                 RETURNING id, student_id, course_id, created_at;",
                params![student_id, course_id],
                |row| parse_enrollment_row(row),
            )
            .map_err(|err| {
                let err = DbError::from(err);
                if err.is_unique_violation() {
                    RepoError::Duplicate("enrollments")
                } else {
                    RepoError::Db(err)
                }
            })?;
        Ok(enrollment)
    }

    fn delete_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM enrollments WHERE id = ?1 AND student_id = ?2;",
            params![enrollment.id, enrollment.student_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "enrollment",
                id: enrollment.id,
            });
        }

        Ok(())
    }
}

fn parse_enrollment_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        course_id: row.get("course_id")?,
        created_at: row.get("created_at")?,
    })
}
