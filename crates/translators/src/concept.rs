//! Concept ↔ CodeableConcept translation.

use std::sync::Arc;

use carebridge_fhir::{CodeableConcept, Coding};
use carebridge_persistence::ConceptRepository;
use carebridge_persistence::model::Concept;
use tracing::debug;

use crate::error::TranslationResult;

pub trait ConceptTranslator: Send + Sync {
    /// A local coding for the concept itself, then one coding per mapping.
    /// `None` when the concept yields no coding at all.
    fn to_codeable_concept(&self, concept: &Concept) -> Option<CodeableConcept>;

    /// Finds the stored concept a CodeableConcept denotes, if any.
    fn to_concept(&self, codeable: &CodeableConcept) -> TranslationResult<Option<Concept>>;
}

/// Resolves concepts against the concept dictionary.
pub struct RepositoryConceptTranslator {
    concepts: Arc<dyn ConceptRepository>,
}

impl RepositoryConceptTranslator {
    pub fn new(concepts: Arc<dyn ConceptRepository>) -> Self {
        Self { concepts }
    }
}

impl ConceptTranslator for RepositoryConceptTranslator {
    fn to_codeable_concept(&self, concept: &Concept) -> Option<CodeableConcept> {
        let mut coding = Vec::with_capacity(concept.mappings.len() + 1);
        if !concept.id.is_empty() {
            let mut local = Coding::new(None, concept.id.clone());
            local.display = concept.name.clone();
            coding.push(local);
        }
        coding.extend(
            concept
                .mappings
                .iter()
                .map(|m| Coding::new(Some(m.source.as_str()), m.code.clone())),
        );

        if coding.is_empty() {
            return None;
        }
        Some(CodeableConcept {
            coding,
            text: concept.name.clone(),
        })
    }

    fn to_concept(&self, codeable: &CodeableConcept) -> TranslationResult<Option<Concept>> {
        if let Some(code) = codeable.first_local().and_then(|c| c.code.as_deref()) {
            if let Some(concept) = self.concepts.get_concept(code)? {
                return Ok(Some(concept));
            }
        }

        for coding in codeable.coding.iter().filter(|c| !c.is_local()) {
            let (Some(system), Some(code)) = (coding.system.as_deref(), coding.code.as_deref())
            else {
                continue;
            };
            if let Some(concept) = self.concepts.find_concept_by_mapping(system, code)? {
                return Ok(Some(concept));
            }
        }

        debug!(codings = codeable.coding.len(), "No stored concept for codeable concept");
        Ok(None)
    }
}
