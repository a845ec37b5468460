//! Storage traits.
//!
//! The record store is a synchronous boundary: every call may block on the
//! database. Async callers run these on a blocking thread.

use crate::error::StorageResult;
use crate::model::{Concept, EnrollmentRecord, Person, Program};
use crate::search::ResolvedQuery;
use crate::types::{IncludedRef, SearchPage};

pub trait PersonRepository: Send + Sync {
    /// Fetches a person, voided or not.
    fn get_person(&self, id: &str) -> StorageResult<Option<Person>>;

    /// Inserts or replaces a person and its identifiers.
    fn save_person(&self, person: &Person) -> StorageResult<()>;
}

pub trait ConceptRepository: Send + Sync {
    fn get_concept(&self, id: &str) -> StorageResult<Option<Concept>>;

    /// Finds the concept mapped to `code` in terminology `source`.
    fn find_concept_by_mapping(&self, source: &str, code: &str)
    -> StorageResult<Option<Concept>>;

    /// Inserts or replaces a concept and its mappings.
    fn save_concept(&self, concept: &Concept) -> StorageResult<()>;
}

pub trait ProgramRepository: Send + Sync {
    fn get_program(&self, id: &str) -> StorageResult<Option<Program>>;

    /// Finds the program described by a concept.
    fn find_program_by_concept(&self, concept_id: &str) -> StorageResult<Option<Program>>;

    /// Inserts or replaces a program, saving its concept first.
    fn save_program(&self, program: &Program) -> StorageResult<()>;
}

pub trait EnrollmentRepository: Send + Sync {
    /// Fetches an enrollment, voided or not.
    fn get_enrollment(&self, id: &str) -> StorageResult<Option<EnrollmentRecord>>;

    /// Inserts or replaces an enrollment, saving its program first.
    ///
    /// The patient must already be stored. The stored `last_updated` is set
    /// to the time of the call.
    fn save_enrollment(&self, record: &EnrollmentRecord) -> StorageResult<()>;

    /// Marks an enrollment voided. Returns whether a live record was voided;
    /// voiding a voided or unknown record is a no-op.
    fn void_enrollment(&self, id: &str) -> StorageResult<bool>;
}

/// Runs resolved searches.
pub trait SearchExecutor: Send + Sync {
    /// Matching ids in query order, with the total count.
    fn execute(&self, query: &ResolvedQuery) -> StorageResult<SearchPage>;

    /// Ids reached from `page_ids` through the query's include
    /// relationships, deduplicated, in include order.
    fn resolve_includes(
        &self,
        query: &ResolvedQuery,
        page_ids: &[String],
    ) -> StorageResult<Vec<IncludedRef>>;
}
