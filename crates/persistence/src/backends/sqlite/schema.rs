//! SQLite schema definitions and migrations.

use rusqlite::Connection;

use crate::error::{BackendError, StorageError, StorageResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

fn internal_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message,
        source: None,
    })
}

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(StorageError::Backend(BackendError::MigrationError {
            message: format!(
                "database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            ),
        }));
    }

    tracing::debug!(version = SCHEMA_VERSION, "SQLite schema ready");
    Ok(())
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> StorageResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| internal_error(format!("Failed to create schema_version table: {}", e)))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> StorageResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| internal_error(format!("Failed to clear schema_version: {}", e)))?;

    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| internal_error(format!("Failed to set schema_version: {}", e)))?;

    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> StorageResult<()> {
    let statements = [
        (
            "person",
            "CREATE TABLE IF NOT EXISTS person (
                id TEXT PRIMARY KEY,
                given_name TEXT,
                family_name TEXT,
                city TEXT,
                state TEXT,
                postal_code TEXT,
                country TEXT,
                voided INTEGER NOT NULL DEFAULT 0,
                last_updated TEXT NOT NULL
            )",
        ),
        (
            "person_identifier",
            "CREATE TABLE IF NOT EXISTS person_identifier (
                person_id TEXT NOT NULL REFERENCES person(id) ON DELETE CASCADE,
                system TEXT,
                value TEXT NOT NULL
            )",
        ),
        (
            "concept",
            "CREATE TABLE IF NOT EXISTS concept (
                id TEXT PRIMARY KEY,
                name TEXT
            )",
        ),
        (
            "concept_mapping",
            "CREATE TABLE IF NOT EXISTS concept_mapping (
                concept_id TEXT NOT NULL REFERENCES concept(id) ON DELETE CASCADE,
                source TEXT NOT NULL,
                code TEXT NOT NULL
            )",
        ),
        (
            "program",
            "CREATE TABLE IF NOT EXISTS program (
                id TEXT PRIMARY KEY,
                name TEXT,
                concept_id TEXT REFERENCES concept(id)
            )",
        ),
        (
            "enrollment",
            "CREATE TABLE IF NOT EXISTS enrollment (
                id TEXT PRIMARY KEY,
                patient_id TEXT REFERENCES person(id),
                program_id TEXT REFERENCES program(id),
                date_enrolled TEXT,
                date_completed TEXT,
                voided INTEGER NOT NULL DEFAULT 0,
                last_updated TEXT NOT NULL
            )",
        ),
        // Every coding of a concept: its own local code, then its mappings.
        (
            "concept_coding",
            "CREATE VIEW IF NOT EXISTS concept_coding AS
                SELECT id AS concept_id, NULL AS system, id AS code FROM concept
                UNION ALL
                SELECT concept_id, source AS system, code FROM concept_mapping",
        ),
    ];

    for (name, sql) in statements {
        conn.execute(sql, [])
            .map_err(|e| internal_error(format!("Failed to create {}: {}", name, e)))?;
    }

    create_indexes(conn)
}

/// Create indexes for efficient queries.
fn create_indexes(conn: &Connection) -> StorageResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_person_identifier ON person_identifier(person_id)",
        "CREATE INDEX IF NOT EXISTS idx_person_identifier_value ON person_identifier(value, system)",
        "CREATE INDEX IF NOT EXISTS idx_person_family ON person(family_name)",
        "CREATE INDEX IF NOT EXISTS idx_concept_mapping ON concept_mapping(concept_id)",
        "CREATE INDEX IF NOT EXISTS idx_concept_mapping_code ON concept_mapping(source, code)",
        "CREATE INDEX IF NOT EXISTS idx_program_concept ON program(concept_id)",
        "CREATE INDEX IF NOT EXISTS idx_enrollment_patient ON enrollment(patient_id)",
        "CREATE INDEX IF NOT EXISTS idx_enrollment_program ON enrollment(program_id)",
        "CREATE INDEX IF NOT EXISTS idx_enrollment_enrolled ON enrollment(date_enrolled)",
    ];

    for index_sql in &indexes {
        conn.execute(index_sql, [])
            .map_err(|e| internal_error(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}
