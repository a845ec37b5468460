//! The `Patient` provider: demographics read and search.

use std::sync::Arc;

use carebridge_fhir::Patient;
use carebridge_persistence::search::{CriteriaBuilder, PersonSearch};
use carebridge_persistence::SearchParameterMap;
use carebridge_translators::{PersonTranslator, ResourceTranslator};
use tracing::debug;

use crate::error::{RestError, RestResult};

use super::{RecordStore, ResourceLoader, SearchResults};

pub struct PatientProvider {
    store: Arc<dyn RecordStore>,
    loader: Arc<ResourceLoader>,
    criteria: CriteriaBuilder<PersonSearch>,
}

impl PatientProvider {
    pub fn new(store: Arc<dyn RecordStore>, loader: Arc<ResourceLoader>) -> Self {
        Self {
            store,
            loader,
            criteria: CriteriaBuilder::new(PersonSearch),
        }
    }

    pub fn get(&self, id: &str) -> RestResult<Patient> {
        let person = self
            .store
            .get_person(id)?
            .filter(|p| !p.voided)
            .ok_or_else(|| RestError::not_found(Patient::RESOURCE_TYPE, id))?;
        Ok(PersonTranslator.to_resource(&person)?)
    }

    pub fn search(&self, map: SearchParameterMap) -> RestResult<SearchResults> {
        let query = self.criteria.resolve(map)?;
        let page = self.store.execute(&query)?;
        debug!(total = page.total, "Patient search matched");
        Ok(SearchResults::new(query, page, self.loader.clone()))
    }
}
