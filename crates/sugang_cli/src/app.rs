//! Command execution over the registration core.

use crate::commands::{CommandLine, Commands};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use sugang_core::db::{open_db, DbError};
use sugang_core::{
    default_log_level, init_logging, CatalogError, CatalogService, ErrorKind, LoggingError,
    RegistrationError, RegistrationService, RepoError, SqliteCatalogRepository,
    SqliteRegistrationRepository,
};

/// Failure of one CLI invocation.
#[derive(Debug)]
pub enum CliError {
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    Catalog(CatalogError),
    Registration(RegistrationError),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Registration(err) => match err.kind() {
                ErrorKind::NotFound => 1,
                ErrorKind::Conflict => 2,
                ErrorKind::Internal => 3,
            },
            _ => 3,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "cannot open database: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Registration(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::Registration(err) => Some(err),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CatalogError> for CliError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<RegistrationError> for CliError {
    fn from(value: RegistrationError) -> Self {
        Self::Registration(value)
    }
}

/// Runs one parsed command and returns the text to print.
pub fn run(cli: &CommandLine) -> Result<String, CliError> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    match &cli.command {
        Commands::Ping => Ok(format!(
            "sugang_core ping={} version={}",
            sugang_core::ping(),
            sugang_core::core_version()
        )),
        Commands::AddStudent { name, major } => {
            let conn = connect(cli)?;
            let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn)?);
            let student = catalog.add_student(name.as_str(), major.as_str())?;
            Ok(format!("student {} created", student.id))
        }
        Commands::AddCourse { title } => {
            let conn = connect(cli)?;
            let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn)?);
            let course = catalog.add_course(title.as_str())?;
            Ok(format!("course {} created", course.id))
        }
        Commands::Students => {
            let conn = connect(cli)?;
            let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn)?);
            let lines = catalog
                .list_students()?
                .into_iter()
                .map(|student| format!("{}\t{}\t{}", student.id, student.name, student.major));
            Ok(join_lines(lines))
        }
        Commands::Courses => {
            let conn = connect(cli)?;
            let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn)?);
            let lines = catalog
                .list_courses()?
                .into_iter()
                .map(|course| format!("{}\t{}", course.id, course.title));
            Ok(join_lines(lines))
        }
        Commands::Register {
            student_id,
            course_id,
        } => {
            let mut conn = connect(cli)?;
            let mut service = registration_service(&mut conn)?;
            let enrollment = service.register(*student_id, *course_id)?;
            Ok(format!(
                "enrollment {} created for student {} in course {}",
                enrollment.id, enrollment.student_id, enrollment.course_id
            ))
        }
        Commands::List { student_id } => {
            let mut conn = connect(cli)?;
            let service = registration_service(&mut conn)?;
            let lines = service
                .list_by_student(*student_id)?
                .into_iter()
                .map(|enrollment| {
                    format!(
                        "{}\tcourse={}\tcreated_at={}",
                        enrollment.id, enrollment.course_id, enrollment.created_at
                    )
                });
            Ok(join_lines(lines))
        }
        Commands::Cancel {
            student_id,
            enrollment_id,
        } => {
            let mut conn = connect(cli)?;
            let mut service = registration_service(&mut conn)?;
            service.cancel(*student_id, *enrollment_id)?;
            Ok(format!("enrollment {enrollment_id} cancelled"))
        }
        Commands::Stats => {
            let mut conn = connect(cli)?;
            let service = registration_service(&mut conn)?;
            let lines = service
                .count_by_course()?
                .into_iter()
                .map(|row| format!("{}\t{}\t{}", row.course_id, row.course_title, row.count));
            Ok(join_lines(lines))
        }
    }
}

/// Opens the database for commands that touch storage.
fn connect(cli: &CommandLine) -> Result<Connection, CliError> {
    let conn = open_db(&cli.db)?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );
    Ok(conn)
}

fn join_lines(lines: impl Iterator<Item = String>) -> String {
    lines.collect::<Vec<_>>().join("\n")
}

fn registration_service(
    conn: &mut Connection,
) -> Result<RegistrationService<SqliteRegistrationRepository<'_>>, CliError> {
    Ok(RegistrationService::new(SqliteRegistrationRepository::try_new(conn)?))
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::AddStudent { .. } => "add_student",
        Commands::AddCourse { .. } => "add_course",
        Commands::Students => "students",
        Commands::Courses => "courses",
        Commands::Register { .. } => "register",
        Commands::List { .. } => "list",
        Commands::Cancel { .. } => "cancel",
        Commands::Stats => "stats",
        Commands::Ping => "ping",
    }
}
