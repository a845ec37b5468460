//! The EpisodeOfCare resource.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::datatypes::{CodeableConcept, Period, Reference};
use crate::serde_helpers::SingleOrVec;

/// Lifecycle status of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeOfCareStatus {
    Active,
    Finished,
}

impl EpisodeOfCareStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeOfCareStatus::Active => "active",
            EpisodeOfCareStatus::Finished => "finished",
        }
    }
}

/// The `type` element of an EpisodeOfCare, restricted to at most one entry.
///
/// `Absent` (element missing) and `Empty` (element present with no entries)
/// are kept apart so that the JSON written back matches what was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EpisodeCategory {
    #[default]
    Absent,
    Empty,
    Single(CodeableConcept),
}

impl EpisodeCategory {
    /// Builds the category from a list, keeping only its first entry.
    pub fn from_list(list: Option<Vec<CodeableConcept>>) -> Self {
        match list {
            None => EpisodeCategory::Absent,
            Some(items) => match items.into_iter().next() {
                Some(first) => EpisodeCategory::Single(first),
                None => EpisodeCategory::Empty,
            },
        }
    }

    pub fn first(&self) -> Option<&CodeableConcept> {
        match self {
            EpisodeCategory::Single(concept) => Some(concept),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        usize::from(matches!(self, EpisodeCategory::Single(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, EpisodeCategory::Absent)
    }
}

impl Serialize for EpisodeCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            EpisodeCategory::Absent => serializer.serialize_none(),
            EpisodeCategory::Empty => Vec::<CodeableConcept>::new().serialize(serializer),
            EpisodeCategory::Single(concept) => std::slice::from_ref(concept).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for EpisodeCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<SingleOrVec<CodeableConcept>> = Option::deserialize(deserializer)?;
        Ok(EpisodeCategory::from_list(raw.map(SingleOrVec::into_vec)))
    }
}

/// An association between a patient and an organization for a period of
/// care, here backed by a program enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeOfCare {
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EpisodeOfCareStatus>,
    #[serde(rename = "type", default, skip_serializing_if = "EpisodeCategory::is_absent")]
    pub category: EpisodeCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

impl EpisodeOfCare {
    pub const RESOURCE_TYPE: &'static str = "EpisodeOfCare";
}

impl Default for EpisodeOfCare {
    fn default() -> Self {
        Self {
            resource_type: Self::RESOURCE_TYPE.to_string(),
            id: None,
            status: None,
            category: EpisodeCategory::Absent,
            patient: None,
            period: None,
        }
    }
}
