//! Internal domain records.
//!
//! These mirror the clinical record store: mutable, denormalized, and keyed by
//! uuid strings. Lifecycle (creation, voiding, timestamps) is owned by the
//! store; translators only read and write the data fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a fresh record identity.
pub fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// An identifier attached to a person, e.g. a medical record number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIdentifier {
    pub system: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonAddress {
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// A patient in the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub identifiers: Vec<PersonIdentifier>,
    pub address: Option<PersonAddress>,
    pub voided: bool,
    pub last_updated: DateTime<Utc>,
}

impl Person {
    pub fn new(given_name: &str, family_name: &str) -> Self {
        Self {
            id: new_uuid(),
            given_name: Some(given_name.to_string()),
            family_name: Some(family_name.to_string()),
            last_updated: Utc::now(),
            ..Default::default()
        }
    }

    /// Display form used in references, e.g. "Jane Doe".
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// A mapping from a concept to a code in an external terminology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMapping {
    /// Terminology system URI.
    pub source: String,
    pub code: String,
}

/// An entry in the local concept dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: String,
    pub name: Option<String>,
    pub mappings: Vec<ConceptMapping>,
}

impl Concept {
    pub fn new(name: &str) -> Self {
        Self {
            id: new_uuid(),
            name: Some(name.to_string()),
            mappings: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, source: &str, code: &str) -> Self {
        self.mappings.push(ConceptMapping {
            source: source.to_string(),
            code: code.to_string(),
        });
        self
    }
}

/// A care program patients can be enrolled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: Option<String>,
    pub concept: Option<Concept>,
}

impl Program {
    /// A new, unsaved program described by `concept`.
    pub fn for_concept(concept: Concept) -> Self {
        Self {
            id: new_uuid(),
            name: concept.name.clone(),
            concept: Some(concept),
        }
    }
}

/// A patient's enrollment in a program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: String,
    pub patient: Option<Person>,
    pub program: Option<Program>,
    pub date_enrolled: Option<DateTime<Utc>>,
    pub date_completed: Option<DateTime<Utc>>,
    pub voided: bool,
    pub last_updated: DateTime<Utc>,
}

impl EnrollmentRecord {
    /// A blank record with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: new_uuid(),
            last_updated: Utc::now(),
            ..Default::default()
        }
    }

    /// Ongoing: neither completed nor voided.
    pub fn is_active(&self) -> bool {
        self.date_completed.is_none() && !self.voided
    }
}
