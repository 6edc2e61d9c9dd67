use sugang_core::{
    Course, CourseEnrollmentCount, CourseId, Enrollment, EnrollmentId, EnrollmentReader,
    EnrollmentWriter, ErrorKind, InMemoryRegistrationRepository, NewCourse, NewStudent,
    RegistrationError, RegistrationRepository, RegistrationService, RepoError, RepoResult,
    Student, StudentId,
};

fn seeded_repo() -> InMemoryRegistrationRepository {
    let mut repo = InMemoryRegistrationRepository::new();
    for name in ["Choi", "Jung", "Kang"] {
        repo.add_student(NewStudent::new(name, "Mathematics")).unwrap();
    }
    repo.add_course(NewCourse::new("Topology")).unwrap();
    repo.add_course(NewCourse::new("Number Theory")).unwrap();
    repo
}

#[test]
fn registration_rules_hold_over_in_memory_storage() {
    let mut service = RegistrationService::new(seeded_repo());

    let enrollment = service.register(1, 1).unwrap();
    assert_eq!(service.list_by_student(1).unwrap(), vec![enrollment.clone()]);

    let err = service.register(1, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = service.cancel(2, enrollment.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(service.list_by_student(1).unwrap().len(), 1);

    service.cancel(1, enrollment.id).unwrap();
    assert!(service.list_by_student(1).unwrap().is_empty());
    service.register(1, 1).unwrap();
}

#[test]
fn rejected_register_leaves_state_untouched() {
    let mut service = RegistrationService::new(seeded_repo());

    assert!(matches!(
        service.register(99, 1),
        Err(RegistrationError::StudentNotFound(99))
    ));
    assert!(matches!(
        service.register(1, 99),
        Err(RegistrationError::CourseNotFound(99))
    ));

    assert!(service.into_repository().enrollments().is_empty());
}

#[test]
fn count_by_course_reports_only_enrolled_courses() {
    let mut service = RegistrationService::new(seeded_repo());
    for student_id in 1..=3 {
        service.register(student_id, 1).unwrap();
    }

    assert_eq!(
        service.count_by_course().unwrap(),
        vec![CourseEnrollmentCount {
            course_id: 1,
            course_title: "Topology".to_string(),
            count: 3,
        }]
    );
}

#[test]
fn failed_write_scope_discards_staged_changes() {
    let mut repo = seeded_repo();

    let result = repo.write(|store| -> Result<(), RepoError> {
        store.insert_enrollment(1, 1)?;
        store.insert_enrollment(1, 2)?;
        Err(RepoError::InvalidData("abort unit of work".to_string()))
    });
    assert!(result.is_err());
    assert!(repo.enrollments().is_empty());

    repo.write(|store| store.insert_enrollment(1, 2)).unwrap();
    assert_eq!(repo.enrollments().len(), 1);
}

#[test]
fn duplicate_insert_is_rejected_by_store() {
    let mut repo = seeded_repo();
    repo.write(|store| store.insert_enrollment(2, 2)).unwrap();

    let err = repo
        .write(|store| store.insert_enrollment(2, 2))
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate("enrollments")));
}

#[test]
fn seeding_rejects_blank_records() {
    let mut repo = InMemoryRegistrationRepository::new();
    let err = repo.add_course(NewCourse::new("   ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

/// Repository whose write scopes see stale reads, as if another writer
/// committed between the rule checks and the mutation.
struct StaleReadRepository {
    inner: InMemoryRegistrationRepository,
}

impl RegistrationRepository for StaleReadRepository {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentReader) -> Result<T, E>,
        E: From<RepoError>,
    {
        self.inner.read(work)
    }

    fn write<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentWriter) -> Result<T, E>,
        E: From<RepoError>,
    {
        self.inner.write(|store| work(&StaleStore { inner: store }))
    }
}

struct StaleStore<'a> {
    inner: &'a dyn EnrollmentWriter,
}

impl EnrollmentReader for StaleStore<'_> {
    fn find_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.inner.find_student(id)
    }

    fn find_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        self.inner.find_course(id)
    }

    /// Still reports the enrollment even if it was already removed.
    fn find_enrollment_for_student(
        &self,
        enrollment_id: EnrollmentId,
        student_id: StudentId,
    ) -> RepoResult<Option<Enrollment>> {
        Ok(Some(Enrollment {
            id: enrollment_id,
            student_id,
            course_id: 1,
            created_at: 0,
        }))
    }

    fn list_enrollments_by_student(&self, student_id: StudentId) -> RepoResult<Vec<Enrollment>> {
        self.inner.list_enrollments_by_student(student_id)
    }

    /// Misses pairs that were already committed.
    fn enrollment_exists(&self, _student_id: StudentId, _course_id: CourseId) -> RepoResult<bool> {
        Ok(false)
    }

    fn count_enrollments_by_course(&self) -> RepoResult<Vec<CourseEnrollmentCount>> {
        self.inner.count_enrollments_by_course()
    }
}

impl EnrollmentWriter for StaleStore<'_> {
    fn insert_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Enrollment> {
        self.inner.insert_enrollment(student_id, course_id)
    }

    fn delete_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()> {
        self.inner.delete_enrollment(enrollment)
    }
}

#[test]
fn duplicate_caught_at_insert_is_reported_as_conflict() {
    let mut service = RegistrationService::new(StaleReadRepository {
        inner: seeded_repo(),
    });
    service.register(1, 1).unwrap();

    let err = service.register(1, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(
        err,
        RegistrationError::AlreadyEnrolled {
            student_id: 1,
            course_id: 1
        }
    ));
    assert_eq!(service.into_repository().inner.enrollments().len(), 1);
}

#[test]
fn enrollment_vanishing_before_delete_is_reported_as_not_found() {
    let mut service = RegistrationService::new(StaleReadRepository {
        inner: seeded_repo(),
    });
    let enrollment = service.register(1, 2).unwrap();
    service.cancel(1, enrollment.id).unwrap();

    let err = service.cancel(1, enrollment.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(
        err,
        RegistrationError::EnrollmentNotFound { student_id: 1, enrollment_id }
            if enrollment_id == enrollment.id
    ));
}
