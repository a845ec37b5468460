//! Enrollment record ↔ EpisodeOfCare translation.

use std::sync::Arc;

use carebridge_fhir::{CodeableConcept, EpisodeCategory, EpisodeOfCare, EpisodeOfCareStatus};
use carebridge_persistence::ProgramRepository;
use carebridge_persistence::model::{EnrollmentRecord, Program};
use tracing::{debug, trace};

use crate::concept::ConceptTranslator;
use crate::error::{TranslationError, TranslationResult};
use crate::patient_reference::PatientReferenceTranslator;
use crate::period::PeriodTranslator;
use crate::ResourceTranslator;

/// Translates program enrollments.
///
/// | EpisodeOfCare | EnrollmentRecord |
/// |---------------|------------------|
/// | `id` | `id` |
/// | `patient` | `patient`, via [`PatientReferenceTranslator`] |
/// | `period.start` | `date_enrolled` |
/// | `period.end` | `date_completed` |
/// | `type[0]` | `program.concept`, via [`ConceptTranslator`] |
/// | `status` | derived from [`EnrollmentRecord::is_active`] |
pub struct EpisodeOfCareTranslator {
    patients: Arc<dyn PatientReferenceTranslator>,
    concepts: Arc<dyn ConceptTranslator>,
    programs: Arc<dyn ProgramRepository>,
}

impl EpisodeOfCareTranslator {
    pub fn new(
        patients: Arc<dyn PatientReferenceTranslator>,
        concepts: Arc<dyn ConceptTranslator>,
        programs: Arc<dyn ProgramRepository>,
    ) -> Self {
        Self {
            patients,
            concepts,
            programs,
        }
    }

    fn category(&self, program: Option<&Program>) -> EpisodeCategory {
        match program
            .and_then(|p| p.concept.as_ref())
            .and_then(|concept| self.concepts.to_codeable_concept(concept))
        {
            Some(codeable) => EpisodeCategory::Single(codeable),
            None => EpisodeCategory::Empty,
        }
    }

    fn status(record: &EnrollmentRecord) -> EpisodeOfCareStatus {
        if record.is_active() {
            EpisodeOfCareStatus::Active
        } else {
            EpisodeOfCareStatus::Finished
        }
    }

    /// The stored program for a category entry, or a new one wrapping the
    /// concept when no program uses it yet.
    fn program_for(&self, codeable: &CodeableConcept) -> TranslationResult<Option<Program>> {
        let Some(concept) = self.concepts.to_concept(codeable)? else {
            debug!("EpisodeOfCare type does not resolve to a known concept");
            return Ok(None);
        };
        match self.programs.find_program_by_concept(&concept.id)? {
            Some(program) => Ok(Some(program)),
            None => Ok(Some(Program::for_concept(concept))),
        }
    }
}

impl ResourceTranslator<EnrollmentRecord, EpisodeOfCare> for EpisodeOfCareTranslator {
    fn to_resource(&self, record: &EnrollmentRecord) -> TranslationResult<EpisodeOfCare> {
        if record.id.is_empty() {
            return Err(TranslationError::precondition(
                "enrollment record has no identity",
            ));
        }

        Ok(EpisodeOfCare {
            id: Some(record.id.clone()),
            status: Some(Self::status(record)),
            category: self.category(record.program.as_ref()),
            patient: record.patient.as_ref().map(|p| self.patients.to_reference(p)),
            period: PeriodTranslator::to_period(record.date_enrolled, record.date_completed),
            ..Default::default()
        })
    }

    fn to_record(&self, resource: &EpisodeOfCare) -> TranslationResult<EnrollmentRecord> {
        let mut record = EnrollmentRecord::new();
        self.merge_into(&mut record, resource)?;
        Ok(record)
    }

    fn merge_into(
        &self,
        existing: &mut EnrollmentRecord,
        resource: &EpisodeOfCare,
    ) -> TranslationResult<()> {
        let patient = self.patients.to_person(resource.patient.as_ref())?;
        let program = match resource.category.first() {
            Some(codeable) => self.program_for(codeable)?,
            None => None,
        };

        if let Some(id) = resource.id.as_deref().filter(|id| !id.is_empty()) {
            existing.id = id.to_string();
        }
        PeriodTranslator::apply(
            resource.period.as_ref(),
            &mut existing.date_enrolled,
            &mut existing.date_completed,
        );
        existing.patient = patient;
        existing.program = program;

        trace!(id = %existing.id, "Merged EpisodeOfCare into enrollment");
        Ok(())
    }
}
