//! Shared records for persistence tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use carebridge_persistence::backends::sqlite::SqliteBackend;
use carebridge_persistence::model::{Concept, EnrollmentRecord, Person, PersonIdentifier, Program};
use carebridge_persistence::repository::{EnrollmentRepository, PersonRepository};

pub const SNOMED: &str = "http://snomed.info/sct";
pub const MRN: &str = "urn:carebridge:mrn";

pub fn create_backend() -> SqliteBackend {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to initialize schema");
    backend
}

pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Stores a person with a fixed id and one medical record number.
pub fn save_person(
    backend: &SqliteBackend,
    id: &str,
    given: &str,
    family: &str,
    mrn: &str,
) -> Person {
    let mut person = Person::new(given, family);
    person.id = id.to_string();
    person.identifiers.push(PersonIdentifier {
        system: Some(MRN.to_string()),
        value: mrn.to_string(),
    });
    backend.save_person(&person).expect("Failed to save person");
    person
}

/// A program whose concept carries a SNOMED mapping.
pub fn program(id: &str, name: &str, snomed: &str) -> Program {
    let mut concept = Concept::new(name).with_mapping(SNOMED, snomed);
    concept.id = format!("concept-{id}");
    Program {
        id: id.to_string(),
        name: Some(name.to_string()),
        concept: Some(concept),
    }
}

/// Stores an enrollment with a fixed id.
pub fn enroll(
    backend: &SqliteBackend,
    id: &str,
    patient: &Person,
    program: &Program,
    enrolled: Option<DateTime<Utc>>,
    completed: Option<DateTime<Utc>>,
) -> EnrollmentRecord {
    let mut record = EnrollmentRecord::new();
    record.id = id.to_string();
    record.patient = Some(patient.clone());
    record.program = Some(program.clone());
    record.date_enrolled = enrolled;
    record.date_completed = completed;
    backend.save_enrollment(&record).expect("Failed to save enrollment");
    record
}

/// Two patients enrolled in HIV and TB programs:
///
/// | id | patient | program | enrolled | completed |
/// |----|---------|---------|----------|-----------|
/// | e1 | p1 Jane Doe | HIV | 2020-01-15 | - |
/// | e2 | p1 Jane Doe | TB | 2021-06-01 | 2021-12-01 |
/// | e3 | p2 John Smith | HIV | 2022-03-10 | - |
pub fn seed_enrollments(backend: &SqliteBackend) {
    let jane = save_person(backend, "p1", "Jane", "Doe", "100");
    let john = save_person(backend, "p2", "John", "Smith", "200");
    let hiv = program("hiv", "HIV Program", "86406008");
    let tb = program("tb", "TB Program", "56717001");

    enroll(backend, "e1", &jane, &hiv, Some(date(2020, 1, 15)), None);
    enroll(
        backend,
        "e2",
        &jane,
        &tb,
        Some(date(2021, 6, 1)),
        Some(date(2021, 12, 1)),
    );
    enroll(backend, "e3", &john, &hiv, Some(date(2022, 3, 10)), None);
}
