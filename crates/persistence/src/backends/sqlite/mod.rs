//! SQLite backend implementation.
//!
//! Supports in-memory databases for tests and file databases for small
//! deployments. Every repository trait and [`SearchExecutor`] is implemented
//! on [`SqliteBackend`].
//!
//! # Example
//!
//! ```no_run
//! use carebridge_persistence::backends::sqlite::SqliteBackend;
//! use carebridge_persistence::model::Person;
//! use carebridge_persistence::repository::PersonRepository;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//!
//! let person = Person::new("Jane", "Doe");
//! backend.save_person(&person)?;
//! assert!(backend.get_person(&person.id)?.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! [`SearchExecutor`]: crate::repository::SearchExecutor

mod backend;
mod schema;
mod search_impl;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use schema::SCHEMA_VERSION;

use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;

use crate::search::SqlParam;

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::String(s) => s.to_sql(),
            SqlParam::Integer(i) => i.to_sql(),
        }
    }
}
