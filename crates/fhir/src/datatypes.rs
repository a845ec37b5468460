//! General-purpose FHIR datatypes shared by the resources in this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::optional_instant;

/// A code defined by a terminology system.
///
/// A coding without a system (or with an empty one) is a *local* coding: its
/// code is only meaningful inside this server's own concept dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    pub fn new(system: Option<&str>, code: impl Into<String>) -> Self {
        Self {
            system: system.map(str::to_string),
            code: Some(code.into()),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// True when the coding has no system or an empty one.
    pub fn is_local(&self) -> bool {
        self.system.as_deref().is_none_or(str::is_empty)
    }

    /// True when the coding belongs to `system`.
    pub fn has_system(&self, system: &str) -> bool {
        self.system.as_deref() == Some(system)
    }
}

/// A concept expressed as zero or more codings plus optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn from_codings(coding: Vec<Coding>) -> Self {
        Self { coding, text: None }
    }

    /// First coding without a system, if any.
    pub fn first_local(&self) -> Option<&Coding> {
        self.coding.iter().find(|c| c.is_local())
    }
}

/// A business identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A reference from one resource to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// Builds a literal `Type/id` reference.
    pub fn to_resource(resource_type: &str, id: &str) -> Self {
        Self {
            reference: Some(format!("{resource_type}/{id}")),
            type_: Some(resource_type.to_string()),
            ..Default::default()
        }
    }

    /// The resource type named by the reference.
    ///
    /// Taken from the explicit `type` when present, otherwise from the
    /// second-to-last path segment of the literal reference.
    pub fn resource_type(&self) -> Option<&str> {
        if let Some(t) = self.type_.as_deref() {
            return Some(t);
        }
        let reference = self.reference.as_deref()?;
        let mut segments = reference.trim_end_matches('/').rsplit('/');
        segments.next()?;
        segments.next().filter(|s| !s.is_empty())
    }

    /// The logical id at the end of the literal reference.
    ///
    /// Handles relative (`Patient/123`), absolute
    /// (`http://host/fhir/Patient/123`) and versioned
    /// (`Patient/123/_history/2`) forms.
    pub fn id_part(&self) -> Option<&str> {
        let reference = self.reference.as_deref()?.trim_end_matches('/');
        let reference = match reference.find("/_history/") {
            Some(pos) => &reference[..pos],
            None => reference,
        };
        reference.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

/// A time range; either side may be open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(default, with = "optional_instant", skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_instant", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// A human name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}
