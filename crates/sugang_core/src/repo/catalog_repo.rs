//! Student/course repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the parent records that enrollments point at.
//! - Own the row mapping shared with the enrollment repository.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - List results are ordered by `id ASC`.

use super::{ensure_connection_ready, RepoResult, RequiredTable};
use crate::model::course::{Course, CourseId, NewCourse};
use crate::model::student::{NewStudent, Student, StudentId};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const STUDENTS_TABLE: RequiredTable = ("students", &["id", "name", "major"]);
pub(crate) const COURSES_TABLE: RequiredTable = ("courses", &["id", "title"]);

/// Repository interface for administrative student/course records.
pub trait CatalogRepository {
    fn create_student(&self, draft: &NewStudent) -> RepoResult<Student>;
    fn create_course(&self, draft: &NewCourse) -> RepoResult<Course>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    fn list_courses(&self) -> RepoResult<Vec<Course>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[STUDENTS_TABLE, COURSES_TABLE])?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_student(&self, draft: &NewStudent) -> RepoResult<Student> {
        draft.validate()?;
        self.conn.execute(
            "INSERT INTO students (name, major) VALUES (?1, ?2);",
            params![draft.name.as_str(), draft.major.as_str()],
        )?;
        Ok(Student::from_new(self.conn.last_insert_rowid(), draft.clone()))
    }

    fn create_course(&self, draft: &NewCourse) -> RepoResult<Course> {
        draft.validate()?;
        self.conn.execute(
            "INSERT INTO courses (title) VALUES (?1);",
            [draft.title.as_str()],
        )?;
        Ok(Course::from_new(self.conn.last_insert_rowid(), draft.clone()))
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        load_student(self.conn, id)
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        load_course(self.conn, id)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, major FROM students ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM courses ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }
        Ok(courses)
    }
}

pub(crate) fn load_student(conn: &Connection, id: StudentId) -> RepoResult<Option<Student>> {
    let student = conn
        .query_row(
            "SELECT id, name, major FROM students WHERE id = ?1;",
            [id],
            |row| parse_student_row(row),
        )
        .optional()?;
    Ok(student)
}

pub(crate) fn load_course(conn: &Connection, id: CourseId) -> RepoResult<Option<Course>> {
    let course = conn
        .query_row(
            "SELECT id, title FROM courses WHERE id = ?1;",
            [id],
            |row| parse_course_row(row),
        )
        .optional()?;
    Ok(course)
}

fn parse_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        major: row.get("major")?,
    })
}

fn parse_course_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get("id")?,
        title: row.get("title")?,
    })
}
