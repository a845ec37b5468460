//! Shared setup for translator tests: an in-memory store with one patient
//! and one program, and translators wired to it.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use carebridge_persistence::backends::sqlite::SqliteBackend;
use carebridge_persistence::model::{Concept, EnrollmentRecord, Person, Program};
use carebridge_persistence::{PersonRepository, ProgramRepository};
use carebridge_translators::{
    EpisodeOfCareTranslator, RepositoryConceptTranslator, RepositoryPatientReferenceTranslator,
};

pub const SNOMED: &str = "http://snomed.info/sct";

pub struct TestStore {
    pub backend: Arc<SqliteBackend>,
    pub person: Person,
    pub program: Program,
}

impl TestStore {
    pub fn new() -> Self {
        let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
        backend.init_schema().expect("Failed to initialize schema");

        let mut person = Person::new("Jane", "Doe");
        person.id = "p1".to_string();
        backend.save_person(&person).expect("Failed to save person");

        let mut concept = Concept::new("HIV Program").with_mapping(SNOMED, "86406008");
        concept.id = "concept-hiv".to_string();
        let mut program = Program::for_concept(concept);
        program.id = "hiv".to_string();
        backend.save_program(&program).expect("Failed to save program");

        Self {
            backend: Arc::new(backend),
            person,
            program,
        }
    }

    pub fn translator(&self) -> EpisodeOfCareTranslator {
        EpisodeOfCareTranslator::new(
            Arc::new(RepositoryPatientReferenceTranslator::new(self.backend.clone())),
            Arc::new(RepositoryConceptTranslator::new(self.backend.clone())),
            self.backend.clone(),
        )
    }

    /// An enrollment of the stored person in the stored program.
    pub fn enrollment(&self) -> EnrollmentRecord {
        let mut record = EnrollmentRecord::new();
        record.patient = Some(self.person.clone());
        record.program = Some(self.program.clone());
        record.date_enrolled = Some(instant(2020, 1, 15));
        record
    }
}

pub fn instant(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap()
}
