//! Choosing a single coding for a concept.

use std::sync::Arc;

use carebridge_fhir::Coding;
use carebridge_fhir::systems::{RXNORM, SNOMED_CT};
use carebridge_persistence::model::Concept;

use crate::concept::ConceptTranslator;

/// Picks one [`Coding`] from a concept's codings by system preference.
///
/// Candidates are tried in order: each preferred system in turn, then the
/// first local coding, then the first coding of any kind. The chosen coding
/// always carries the display of the first local coding, or none when the
/// concept has no local coding.
pub struct CodingPreferenceResolver {
    concepts: Arc<dyn ConceptTranslator>,
    preferred_systems: Vec<String>,
}

impl CodingPreferenceResolver {
    pub fn new(concepts: Arc<dyn ConceptTranslator>, preferred_systems: Vec<String>) -> Self {
        Self {
            concepts,
            preferred_systems,
        }
    }

    /// Preference used for medication quantities: RxNorm, then SNOMED CT.
    pub fn medication_quantity(concepts: Arc<dyn ConceptTranslator>) -> Self {
        Self::new(concepts, vec![RXNORM.to_string(), SNOMED_CT.to_string()])
    }

    pub fn preferred_systems(&self) -> &[String] {
        &self.preferred_systems
    }

    pub fn resolve(&self, concept: Option<&Concept>) -> Option<Coding> {
        let codeable = self.concepts.to_codeable_concept(concept?)?;

        let preferred = self
            .preferred_systems
            .iter()
            .find_map(|system| codeable.coding.iter().find(|c| c.has_system(system)));
        let mut chosen = preferred
            .or_else(|| codeable.first_local())
            .or_else(|| codeable.coding.first())?
            .clone();

        chosen.display = codeable.first_local().and_then(|c| c.display.clone());
        Some(chosen)
    }
}
