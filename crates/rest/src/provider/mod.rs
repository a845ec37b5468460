//! Resource providers: the CRUD and search contract behind the HTTP routes.
//!
//! Providers are synchronous. They call straight into the record store and
//! must be run on a blocking thread from async code.

mod episode_of_care;
mod patient;
mod search_results;

use std::sync::Arc;

use carebridge_fhir::{EpisodeOfCare, Patient};
use carebridge_persistence::backends::sqlite::SqliteBackend;
use carebridge_persistence::{
    ConceptRepository, EnrollmentRepository, PersonRepository, ProgramRepository, SearchExecutor,
    StorageResult,
};
use carebridge_translators::{
    EpisodeOfCareTranslator, PersonTranslator, RepositoryConceptTranslator,
    RepositoryPatientReferenceTranslator, ResourceTranslator,
};
use serde_json::Value;
use tracing::debug;

use crate::error::{RestError, RestResult};

pub use episode_of_care::EpisodeOfCareProvider;
pub use patient::PatientProvider;
pub use search_results::{PageEntries, SearchResults};

/// Everything the providers need from storage.
pub trait RecordStore:
    PersonRepository + ConceptRepository + ProgramRepository + EnrollmentRepository + SearchExecutor
{
    /// Short name reported by the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Checks that the store can serve requests.
    fn health_check(&self) -> StorageResult<()>;
}

impl RecordStore for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn health_check(&self) -> StorageResult<()> {
        SqliteBackend::health_check(self)
    }
}

/// The providers for every resource type the server exposes, wired to one
/// store.
pub struct ResourceProviders {
    pub episodes: EpisodeOfCareProvider,
    pub patients: PatientProvider,
}

impl ResourceProviders {
    pub fn new<S: RecordStore + 'static>(store: Arc<S>) -> Self {
        let translator = Arc::new(EpisodeOfCareTranslator::new(
            Arc::new(RepositoryPatientReferenceTranslator::new(store.clone())),
            Arc::new(RepositoryConceptTranslator::new(store.clone())),
            store.clone(),
        ));
        let store: Arc<dyn RecordStore> = store;
        let loader = Arc::new(ResourceLoader::new(store.clone(), translator.clone()));

        Self {
            episodes: EpisodeOfCareProvider::new(store.clone(), translator, loader.clone()),
            patients: PatientProvider::new(store, loader),
        }
    }
}

/// Loads live records by external type and id and renders them as JSON.
///
/// Used for search pages, where matches and included records of different
/// types end up in the same Bundle.
pub struct ResourceLoader {
    store: Arc<dyn RecordStore>,
    episodes: Arc<EpisodeOfCareTranslator>,
}

impl ResourceLoader {
    pub fn new(store: Arc<dyn RecordStore>, episodes: Arc<EpisodeOfCareTranslator>) -> Self {
        Self { store, episodes }
    }

    pub(crate) fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// The resource for `resource_type/id`, or `None` when the record is
    /// missing or voided.
    pub fn load(&self, resource_type: &str, id: &str) -> RestResult<Option<Value>> {
        let value = match resource_type {
            EpisodeOfCare::RESOURCE_TYPE => match self.store.get_enrollment(id)? {
                Some(record) if !record.voided => {
                    Some(to_json(&self.episodes.to_resource(&record)?)?)
                }
                _ => None,
            },
            Patient::RESOURCE_TYPE => match self.store.get_person(id)? {
                Some(person) if !person.voided => {
                    Some(to_json(&PersonTranslator.to_resource(&person)?)?)
                }
                _ => None,
            },
            other => {
                return Err(RestError::internal(format!(
                    "no loader for resource type {other}"
                )));
            }
        };
        if value.is_none() {
            debug!(resource_type, id, "Record vanished or voided before it was loaded");
        }
        Ok(value)
    }
}

fn to_json<T: serde::Serialize>(resource: &T) -> RestResult<Value> {
    serde_json::to_value(resource)
        .map_err(|e| RestError::internal(format!("Failed to serialize resource: {}", e)))
}
