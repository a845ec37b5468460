//! CareBridge Persistence Layer
//!
//! Record store and search-predicate engine behind the CareBridge FHIR
//! facade. Clinical data lives in internal records ([`model`]); this crate
//! stores them and answers FHIR-style searches over them.
//!
//! # Architecture
//!
//! - [`model`] - internal domain records (person, concept, program, enrollment)
//! - [`repository`] - storage traits
//! - [`types`] - search parameter maps and search results
//! - [`search`] - the criteria builder and per-kind SQL handlers
//! - [`backends`] - backend implementations (SQLite)
//! - [`error`] - error types for all operations
//!
//! # Search
//!
//! ```no_run
//! use carebridge_persistence::backends::sqlite::SqliteBackend;
//! use carebridge_persistence::repository::SearchExecutor;
//! use carebridge_persistence::search::{CriteriaBuilder, EnrollmentSearch};
//! use carebridge_persistence::types::{
//!     SearchKind, SearchParameterMap, TokenAndListParam, TokenParam,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//!
//! let map = SearchParameterMap::new().with_tokens(
//!     SearchKind::Type,
//!     TokenAndListParam::single(TokenParam::parse("http://snomed.info/sct|86406008")),
//! );
//! let query = CriteriaBuilder::new(EnrollmentSearch).resolve(map)?;
//! let page = backend.execute(&query)?;
//! println!("{} matches", page.total);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod error;
pub mod model;
pub mod repository;
pub mod search;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use repository::{
    ConceptRepository, EnrollmentRepository, PersonRepository, ProgramRepository, SearchExecutor,
};
pub use types::{SearchKind, SearchPage, SearchParameterMap};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
