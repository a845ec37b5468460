//! Test data fixtures.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use carebridge_persistence::backends::sqlite::SqliteBackend;
use carebridge_persistence::model::{
    Concept, EnrollmentRecord, Person, PersonIdentifier, Program,
};
use carebridge_persistence::{EnrollmentRepository, PersonRepository, ProgramRepository};

pub const SNOMED: &str = "http://snomed.info/sct";
pub const MRN: &str = "urn:carebridge:mrn";
pub const HIV_CODE: &str = "86406008";
pub const TB_CODE: &str = "56717001";

pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn save_person(backend: &SqliteBackend, id: &str, given: &str, family: &str) -> Person {
    let mut person = Person::new(given, family);
    person.id = id.to_string();
    person.identifiers.push(PersonIdentifier {
        system: Some(MRN.to_string()),
        value: format!("mrn-{id}"),
    });
    backend.save_person(&person).expect("Failed to save person");
    person
}

/// Stores a program whose concept `concept-{id}` maps to a SNOMED code.
pub fn save_program(backend: &SqliteBackend, id: &str, name: &str, snomed: &str) -> Program {
    let mut concept = Concept::new(name).with_mapping(SNOMED, snomed);
    concept.id = format!("concept-{id}");
    let program = Program {
        id: id.to_string(),
        name: Some(name.to_string()),
        concept: Some(concept),
    };
    backend.save_program(&program).expect("Failed to save program");
    program
}

pub fn enroll(
    backend: &SqliteBackend,
    id: &str,
    patient: &Person,
    program: &Program,
    enrolled: DateTime<Utc>,
    completed: Option<DateTime<Utc>>,
) -> EnrollmentRecord {
    let mut record = EnrollmentRecord::new();
    record.id = id.to_string();
    record.patient = Some(patient.clone());
    record.program = Some(program.clone());
    record.date_enrolled = Some(enrolled);
    record.date_completed = completed;
    backend
        .save_enrollment(&record)
        .expect("Failed to save enrollment");
    record
}

/// Two patients and two programs, with no enrollments.
pub fn seed_reference_data(backend: &SqliteBackend) {
    save_person(backend, "p1", "Jane", "Doe");
    save_person(backend, "p2", "John", "Smith");
    save_program(backend, "hiv", "HIV Program", HIV_CODE);
    save_program(backend, "tb", "TB Program", TB_CODE);
}

/// Reference data plus three enrollments:
///
/// | id | patient | program | enrolled | completed |
/// |----|---------|---------|----------|-----------|
/// | e1 | p1 Jane Doe | HIV | 2020-01-15 | - |
/// | e2 | p1 Jane Doe | TB | 2021-06-01 | 2021-12-01 |
/// | e3 | p2 John Smith | HIV | 2022-03-10 | - |
pub fn seed_enrollments(backend: &SqliteBackend) {
    let jane = save_person(backend, "p1", "Jane", "Doe");
    let john = save_person(backend, "p2", "John", "Smith");
    let hiv = save_program(backend, "hiv", "HIV Program", HIV_CODE);
    let tb = save_program(backend, "tb", "TB Program", TB_CODE);

    enroll(backend, "e1", &jane, &hiv, date(2020, 1, 15), None);
    enroll(
        backend,
        "e2",
        &jane,
        &tb,
        date(2021, 6, 1),
        Some(date(2021, 12, 1)),
    );
    enroll(backend, "e3", &john, &hiv, date(2022, 3, 10), None);
}

/// An EpisodeOfCare request body for `patient` in the program mapped to
/// `snomed`.
pub fn episode_body(patient: &str, snomed: &str, start: &str) -> Value {
    json!({
        "resourceType": "EpisodeOfCare",
        "type": [{
            "coding": [{ "system": SNOMED, "code": snomed }]
        }],
        "patient": { "reference": format!("Patient/{patient}") },
        "period": { "start": start }
    })
}
