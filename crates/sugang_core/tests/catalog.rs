use rusqlite::Connection;
use sugang_core::db::migrations::latest_version;
use sugang_core::db::open_db_in_memory;
use sugang_core::{
    CatalogError, CatalogRepository, CatalogService, NewStudent, RepoError,
    SqliteCatalogRepository, ValidationError,
};

#[test]
fn add_student_trims_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let student = service.add_student("  Song Haeun ", " Computer Science").unwrap();
    assert_eq!(student.name, "Song Haeun");
    assert_eq!(student.major, "Computer Science");

    let loaded = service.get_student(student.id).unwrap().unwrap();
    assert_eq!(loaded, student);
}

#[test]
fn add_student_rejects_blank_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let err = service.add_student("Lee", "   ").unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Invalid(ValidationError::BlankField("major"))
    ));
    assert!(service.list_students().unwrap().is_empty());
}

#[test]
fn add_course_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let err = service.add_course("").unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Invalid(ValidationError::BlankField("title"))
    ));
}

#[test]
fn repository_validates_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let draft = NewStudent {
        name: String::new(),
        major: "History".to_string(),
    };
    let err = repo.create_student(&draft).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn lists_are_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let databases = service.add_course("Databases").unwrap();
    let algorithms = service.add_course("Algorithms").unwrap();

    let courses = service.list_courses().unwrap();
    assert_eq!(courses, vec![databases.clone(), algorithms]);
    assert_eq!(
        service.get_course(databases.id).unwrap().map(|c| c.title),
        Some("Databases".to_string())
    );
    assert!(service.get_course(999).unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCatalogRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCatalogRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "students",
            column: "major"
        })
    ));
}
