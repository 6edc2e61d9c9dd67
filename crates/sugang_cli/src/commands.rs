//! Command-line surface for the `sugang` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sugang_core::{CourseId, EnrollmentId, StudentId};

#[derive(Debug, Parser)]
#[command(name = "sugang")]
#[command(about = "Course registration for students and administrators.")]
#[command(version)]
pub struct CommandLine {
    /// SQLite database file; created and migrated on first use.
    #[arg(long, env = "SUGANG_DB", default_value = "sugang.sqlite3")]
    pub db: PathBuf,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "SUGANG_LOG_DIR")]
    pub log_dir: Option<String>,
    /// One of trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "SUGANG_LOG_LEVEL")]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a student record
    AddStudent { name: String, major: String },
    /// Create a course record
    AddCourse { title: String },
    /// List all students
    Students,
    /// List all courses
    Courses,
    /// Enroll a student in a course
    #[command(alias = "r")]
    Register {
        student_id: StudentId,
        course_id: CourseId,
    },
    /// List a student's enrollments
    #[command(alias = "ls")]
    List { student_id: StudentId },
    /// Cancel one of a student's enrollments
    Cancel {
        student_id: StudentId,
        enrollment_id: EnrollmentId,
    },
    /// Show enrollment counts per course
    Stats,
    /// Check that the core library is linked
    Ping,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
