//! The `EpisodeOfCare` provider.

use std::sync::Arc;

use carebridge_fhir::{EpisodeOfCare, OperationOutcome};
use carebridge_persistence::model::{EnrollmentRecord, new_uuid};
use carebridge_persistence::search::{CriteriaBuilder, EnrollmentSearch};
use carebridge_persistence::SearchParameterMap;
use carebridge_translators::{EpisodeOfCareTranslator, ResourceTranslator};
use tracing::{debug, info};

use crate::error::{RestError, RestResult};
use crate::responses::operation_outcome::deleted_outcome;

use super::{RecordStore, ResourceLoader, SearchResults};

/// Program enrollments exposed as `EpisodeOfCare`.
pub struct EpisodeOfCareProvider {
    store: Arc<dyn RecordStore>,
    translator: Arc<EpisodeOfCareTranslator>,
    loader: Arc<ResourceLoader>,
    criteria: CriteriaBuilder<EnrollmentSearch>,
}

impl EpisodeOfCareProvider {
    pub fn new(
        store: Arc<dyn RecordStore>,
        translator: Arc<EpisodeOfCareTranslator>,
        loader: Arc<ResourceLoader>,
    ) -> Self {
        Self {
            store,
            translator,
            loader,
            criteria: CriteriaBuilder::new(EnrollmentSearch),
        }
    }

    fn live_record(&self, id: &str) -> RestResult<Option<EnrollmentRecord>> {
        Ok(self.store.get_enrollment(id)?.filter(|r| !r.voided))
    }

    /// Reads one episode. Missing and voided records are both not found.
    pub fn get(&self, id: &str) -> RestResult<EpisodeOfCare> {
        let record = self
            .live_record(id)?
            .ok_or_else(|| RestError::not_found(EpisodeOfCare::RESOURCE_TYPE, id))?;
        Ok(self.translator.to_resource(&record)?)
    }

    /// Stores a new episode under a server-assigned id. Any id in the body
    /// is ignored.
    pub fn create(&self, resource: &EpisodeOfCare) -> RestResult<EpisodeOfCare> {
        let mut record = self.translator.to_record(resource)?;
        record.id = new_uuid();
        self.store.save_enrollment(&record)?;

        info!(id = %record.id, "Created EpisodeOfCare");
        self.get(&record.id)
    }

    /// Merges `resource` into the stored episode `id`.
    ///
    /// The id must be given, must agree with the body's id when the body has
    /// one, and must name a live record: update never creates.
    pub fn update(&self, id: Option<&str>, resource: &EpisodeOfCare) -> RestResult<EpisodeOfCare> {
        let id = id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RestError::invalid("EpisodeOfCare update requires an id"))?;
        if let Some(body_id) = resource.id.as_deref().filter(|b| !b.is_empty()) {
            if body_id != id {
                return Err(RestError::invalid(format!(
                    "Resource id {body_id} does not match request id {id}"
                )));
            }
        }

        let mut record = self.live_record(id)?.ok_or_else(|| {
            RestError::not_allowed(format!(
                "EpisodeOfCare/{id} does not exist and cannot be created by update"
            ))
        })?;
        self.translator.merge_into(&mut record, resource)?;
        record.id = id.to_string();
        self.store.save_enrollment(&record)?;

        info!(id, "Updated EpisodeOfCare");
        self.get(id)
    }

    /// Voids the episode. Repeating the call, or naming an unknown id,
    /// returns the same outcome.
    pub fn delete(&self, id: &str) -> RestResult<OperationOutcome> {
        let voided = self.store.void_enrollment(id)?;
        if voided {
            info!(id, "Voided EpisodeOfCare");
        } else {
            debug!(id, "Delete found no live EpisodeOfCare");
        }
        Ok(deleted_outcome())
    }

    /// Runs a search. Paging and includes are applied by the returned
    /// [`SearchResults`].
    pub fn search(&self, map: SearchParameterMap) -> RestResult<SearchResults> {
        let query = self.criteria.resolve(map)?;
        let page = self.store.execute(&query)?;
        debug!(total = page.total, "EpisodeOfCare search matched");
        Ok(SearchResults::new(query, page, self.loader.clone()))
    }
}
