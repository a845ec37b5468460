//! Person ↔ Reference translation.

use std::sync::Arc;

use carebridge_fhir::{Identifier, Patient, Reference};
use carebridge_persistence::PersonRepository;
use carebridge_persistence::model::Person;
use tracing::debug;

use crate::error::TranslationResult;

pub trait PatientReferenceTranslator: Send + Sync {
    fn to_reference(&self, person: &Person) -> Reference;

    /// Resolves a reference to a stored person. A missing reference, one
    /// to another resource type, or one to an unknown id yields `None`.
    fn to_person(&self, reference: Option<&Reference>) -> TranslationResult<Option<Person>>;
}

pub struct RepositoryPatientReferenceTranslator {
    persons: Arc<dyn PersonRepository>,
}

impl RepositoryPatientReferenceTranslator {
    pub fn new(persons: Arc<dyn PersonRepository>) -> Self {
        Self { persons }
    }
}

impl PatientReferenceTranslator for RepositoryPatientReferenceTranslator {
    fn to_reference(&self, person: &Person) -> Reference {
        let mut reference = Reference::to_resource(Patient::RESOURCE_TYPE, &person.id);
        reference.display = person.display_name();
        reference.identifier = person.identifiers.first().map(|i| Identifier {
            system: i.system.clone(),
            value: Some(i.value.clone()),
        });
        reference
    }

    fn to_person(&self, reference: Option<&Reference>) -> TranslationResult<Option<Person>> {
        let Some(reference) = reference else {
            return Ok(None);
        };
        if reference
            .resource_type()
            .is_some_and(|t| t != Patient::RESOURCE_TYPE)
        {
            debug!(reference = ?reference.reference, "Reference is not to a Patient");
            return Ok(None);
        }
        let Some(id) = reference.id_part() else {
            return Ok(None);
        };
        Ok(self.persons.get_person(id)?)
    }
}
