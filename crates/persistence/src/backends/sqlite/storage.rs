//! Repository implementations for SQLite.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::{
    BackendError, ResourceError, StorageError, StorageResult, ValidationError,
};
use crate::model::{
    Concept, ConceptMapping, EnrollmentRecord, Person, PersonAddress, PersonIdentifier, Program,
};
use crate::repository::{
    ConceptRepository, EnrollmentRepository, PersonRepository, ProgramRepository,
};
use crate::search::fragment::timestamp_text;

use super::SqliteBackend;

fn internal_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message,
        source: None,
    })
}

fn serialization_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::SerializationError { message })
}

fn parse_timestamp(text: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| serialization_error(format!("Invalid stored timestamp '{}': {}", text, e)))
}

fn parse_optional_timestamp(text: Option<String>) -> StorageResult<Option<DateTime<Utc>>> {
    text.as_deref().map(parse_timestamp).transpose()
}

fn require_id(id: &str, field: &str) -> StorageResult<()> {
    if id.is_empty() {
        return Err(ValidationError::MissingRequiredField {
            field: field.to_string(),
        }
        .into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

fn load_person(conn: &Connection, id: &str) -> StorageResult<Option<Person>> {
    let row = conn
        .query_row(
            "SELECT given_name, family_name, city, state, postal_code, country, voided, last_updated
             FROM person WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    PersonAddress {
                        city: row.get(2)?,
                        state: row.get(3)?,
                        postal_code: row.get(4)?,
                        country: row.get(5)?,
                    },
                    row.get::<_, bool>(6)?,
                    row.get::<_, String>(7)?,
                ))
            },
        )
        .optional()
        .map_err(|e| internal_error(format!("Failed to read person: {}", e)))?;

    let Some((given_name, family_name, address, voided, last_updated)) = row else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare("SELECT system, value FROM person_identifier WHERE person_id = ?1 ORDER BY rowid")
        .map_err(|e| internal_error(format!("Failed to prepare identifier query: {}", e)))?;
    let identifiers = stmt
        .query_map([id], |row| {
            Ok(PersonIdentifier {
                system: row.get(0)?,
                value: row.get(1)?,
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| internal_error(format!("Failed to read identifiers: {}", e)))?;

    let has_address = address != PersonAddress::default();
    Ok(Some(Person {
        id: id.to_string(),
        given_name,
        family_name,
        identifiers,
        address: has_address.then_some(address),
        voided,
        last_updated: parse_timestamp(&last_updated)?,
    }))
}

fn write_person(conn: &Connection, person: &Person) -> StorageResult<()> {
    require_id(&person.id, "person.id")?;
    let address = person.address.clone().unwrap_or_default();

    conn.execute(
        "INSERT INTO person (id, given_name, family_name, city, state, postal_code, country, voided, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            given_name = excluded.given_name,
            family_name = excluded.family_name,
            city = excluded.city,
            state = excluded.state,
            postal_code = excluded.postal_code,
            country = excluded.country,
            voided = excluded.voided,
            last_updated = excluded.last_updated",
        params![
            person.id,
            person.given_name,
            person.family_name,
            address.city,
            address.state,
            address.postal_code,
            address.country,
            person.voided,
            timestamp_text(&person.last_updated),
        ],
    )
    .map_err(|e| internal_error(format!("Failed to write person: {}", e)))?;

    conn.execute("DELETE FROM person_identifier WHERE person_id = ?1", [&person.id])
        .map_err(|e| internal_error(format!("Failed to clear identifiers: {}", e)))?;
    for identifier in &person.identifiers {
        conn.execute(
            "INSERT INTO person_identifier (person_id, system, value) VALUES (?1, ?2, ?3)",
            params![person.id, identifier.system, identifier.value],
        )
        .map_err(|e| internal_error(format!("Failed to write identifier: {}", e)))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Concept / Program
// ---------------------------------------------------------------------------

fn load_concept(conn: &Connection, id: &str) -> StorageResult<Option<Concept>> {
    let name = conn
        .query_row("SELECT name FROM concept WHERE id = ?1", [id], |row| {
            row.get::<_, Option<String>>(0)
        })
        .optional()
        .map_err(|e| internal_error(format!("Failed to read concept: {}", e)))?;

    let Some(name) = name else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare("SELECT source, code FROM concept_mapping WHERE concept_id = ?1 ORDER BY rowid")
        .map_err(|e| internal_error(format!("Failed to prepare mapping query: {}", e)))?;
    let mappings = stmt
        .query_map([id], |row| {
            Ok(ConceptMapping {
                source: row.get(0)?,
                code: row.get(1)?,
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| internal_error(format!("Failed to read mappings: {}", e)))?;

    Ok(Some(Concept {
        id: id.to_string(),
        name,
        mappings,
    }))
}

fn write_concept(conn: &Connection, concept: &Concept) -> StorageResult<()> {
    require_id(&concept.id, "concept.id")?;
    conn.execute(
        "INSERT INTO concept (id, name) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        params![concept.id, concept.name],
    )
    .map_err(|e| internal_error(format!("Failed to write concept: {}", e)))?;

    conn.execute("DELETE FROM concept_mapping WHERE concept_id = ?1", [&concept.id])
        .map_err(|e| internal_error(format!("Failed to clear mappings: {}", e)))?;
    for mapping in &concept.mappings {
        conn.execute(
            "INSERT INTO concept_mapping (concept_id, source, code) VALUES (?1, ?2, ?3)",
            params![concept.id, mapping.source, mapping.code],
        )
        .map_err(|e| internal_error(format!("Failed to write mapping: {}", e)))?;
    }
    Ok(())
}

fn load_program(conn: &Connection, id: &str) -> StorageResult<Option<Program>> {
    let row = conn
        .query_row(
            "SELECT name, concept_id FROM program WHERE id = ?1",
            [id],
            |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
        )
        .optional()
        .map_err(|e| internal_error(format!("Failed to read program: {}", e)))?;

    let Some((name, concept_id)) = row else {
        return Ok(None);
    };
    let concept = match concept_id {
        Some(concept_id) => load_concept(conn, &concept_id)?,
        None => None,
    };

    Ok(Some(Program {
        id: id.to_string(),
        name,
        concept,
    }))
}

fn write_program(conn: &Connection, program: &Program) -> StorageResult<()> {
    require_id(&program.id, "program.id")?;
    if let Some(concept) = &program.concept {
        write_concept(conn, concept)?;
    }
    conn.execute(
        "INSERT INTO program (id, name, concept_id) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, concept_id = excluded.concept_id",
        params![
            program.id,
            program.name,
            program.concept.as_ref().map(|c| c.id.as_str())
        ],
    )
    .map_err(|e| internal_error(format!("Failed to write program: {}", e)))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Enrollment
// ---------------------------------------------------------------------------

fn load_enrollment(conn: &Connection, id: &str) -> StorageResult<Option<EnrollmentRecord>> {
    let row = conn
        .query_row(
            "SELECT patient_id, program_id, date_enrolled, date_completed, voided, last_updated
             FROM enrollment WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()
        .map_err(|e| internal_error(format!("Failed to read enrollment: {}", e)))?;

    let Some((patient_id, program_id, enrolled, completed, voided, last_updated)) = row else {
        return Ok(None);
    };

    let patient = match patient_id {
        Some(patient_id) => load_person(conn, &patient_id)?,
        None => None,
    };
    let program = match program_id {
        Some(program_id) => load_program(conn, &program_id)?,
        None => None,
    };

    Ok(Some(EnrollmentRecord {
        id: id.to_string(),
        patient,
        program,
        date_enrolled: parse_optional_timestamp(enrolled)?,
        date_completed: parse_optional_timestamp(completed)?,
        voided,
        last_updated: parse_timestamp(&last_updated)?,
    }))
}

fn person_exists(conn: &Connection, id: &str) -> StorageResult<bool> {
    conn.query_row("SELECT 1 FROM person WHERE id = ?1", [id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| internal_error(format!("Failed to look up person: {}", e)))
}

impl PersonRepository for SqliteBackend {
    fn get_person(&self, id: &str) -> StorageResult<Option<Person>> {
        let conn = self.get_connection()?;
        load_person(&conn, id)
    }

    fn save_person(&self, person: &Person) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;
        write_person(&tx, person)?;
        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit person: {}", e)))?;
        debug!(id = %person.id, "Saved person");
        Ok(())
    }
}

impl ConceptRepository for SqliteBackend {
    fn get_concept(&self, id: &str) -> StorageResult<Option<Concept>> {
        let conn = self.get_connection()?;
        load_concept(&conn, id)
    }

    fn find_concept_by_mapping(&self, source: &str, code: &str) -> StorageResult<Option<Concept>> {
        let conn = self.get_connection()?;
        let concept_id = conn
            .query_row(
                "SELECT concept_id FROM concept_mapping WHERE source = ?1 AND code = ?2
                 ORDER BY concept_id LIMIT 1",
                [source, code],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| internal_error(format!("Failed to look up mapping: {}", e)))?;

        match concept_id {
            Some(concept_id) => load_concept(&conn, &concept_id),
            None => Ok(None),
        }
    }

    fn save_concept(&self, concept: &Concept) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;
        write_concept(&tx, concept)?;
        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit concept: {}", e)))?;
        Ok(())
    }
}

impl ProgramRepository for SqliteBackend {
    fn get_program(&self, id: &str) -> StorageResult<Option<Program>> {
        let conn = self.get_connection()?;
        load_program(&conn, id)
    }

    fn find_program_by_concept(&self, concept_id: &str) -> StorageResult<Option<Program>> {
        let conn = self.get_connection()?;
        let program_id = conn
            .query_row(
                "SELECT id FROM program WHERE concept_id = ?1 ORDER BY id LIMIT 1",
                [concept_id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| internal_error(format!("Failed to look up program: {}", e)))?;

        match program_id {
            Some(program_id) => load_program(&conn, &program_id),
            None => Ok(None),
        }
    }

    fn save_program(&self, program: &Program) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;
        write_program(&tx, program)?;
        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit program: {}", e)))?;
        Ok(())
    }
}

impl EnrollmentRepository for SqliteBackend {
    fn get_enrollment(&self, id: &str) -> StorageResult<Option<EnrollmentRecord>> {
        let conn = self.get_connection()?;
        load_enrollment(&conn, id)
    }

    fn save_enrollment(&self, record: &EnrollmentRecord) -> StorageResult<()> {
        require_id(&record.id, "enrollment.id")?;
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        if let Some(patient) = &record.patient {
            if !person_exists(&tx, &patient.id)? {
                return Err(ResourceError::DanglingReference {
                    record_type: "Enrollment".to_string(),
                    id: record.id.clone(),
                    target_type: "Person".to_string(),
                    target_id: patient.id.clone(),
                }
                .into());
            }
        }
        if let Some(program) = &record.program {
            write_program(&tx, program)?;
        }

        tx.execute(
            "INSERT INTO enrollment (id, patient_id, program_id, date_enrolled, date_completed, voided, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                patient_id = excluded.patient_id,
                program_id = excluded.program_id,
                date_enrolled = excluded.date_enrolled,
                date_completed = excluded.date_completed,
                voided = excluded.voided,
                last_updated = excluded.last_updated",
            params![
                record.id,
                record.patient.as_ref().map(|p| p.id.as_str()),
                record.program.as_ref().map(|p| p.id.as_str()),
                record.date_enrolled.as_ref().map(timestamp_text),
                record.date_completed.as_ref().map(timestamp_text),
                record.voided,
                timestamp_text(&Utc::now()),
            ],
        )
        .map_err(|e| internal_error(format!("Failed to write enrollment: {}", e)))?;

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit enrollment: {}", e)))?;
        debug!(id = %record.id, "Saved enrollment");
        Ok(())
    }

    fn void_enrollment(&self, id: &str) -> StorageResult<bool> {
        let conn = self.get_connection()?;
        let changed = conn
            .execute(
                "UPDATE enrollment SET voided = 1, last_updated = ?1 WHERE id = ?2 AND voided = 0",
                params![timestamp_text(&Utc::now()), id],
            )
            .map_err(|e| internal_error(format!("Failed to void enrollment: {}", e)))?;
        debug!(id, voided = changed > 0, "Void enrollment");
        Ok(changed > 0)
    }
}
