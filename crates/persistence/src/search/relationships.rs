//! Named relationships followed by `_include` and `_revinclude`.

use crate::types::IncludeParam;

use super::fragment::{SqlFragment, SqlParam};

/// A reference from one stored entity to another, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    /// External type holding the reference.
    pub source_type: &'static str,
    /// Parameter name of the reference, e.g. `patient`.
    pub name: &'static str,
    /// External type being referenced.
    pub target_type: &'static str,
    pub source_table: &'static str,
    pub reference_column: &'static str,
    pub target_table: &'static str,
}

/// Every relationship the store can follow.
pub const RELATIONSHIPS: &[Relationship] = &[Relationship {
    source_type: "EpisodeOfCare",
    name: "patient",
    target_type: "Patient",
    source_table: "enrollment",
    reference_column: "patient_id",
    target_table: "person",
}];

/// Looks up the relationship an include directive names.
pub fn find_relationship(include: &IncludeParam) -> Option<&'static Relationship> {
    RELATIONSHIPS.iter().find(|r| {
        r.source_type == include.source_type
            && r.name == include.relationship
            && include
                .target_type
                .as_deref()
                .is_none_or(|t| t == r.target_type)
    })
}

/// Whether an include pulls referenced records in or referencing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeType {
    /// Forward include (_include): records the results point at.
    Include,
    /// Reverse include (_revinclude): records pointing at the results.
    Revinclude,
}

/// An include directive checked against the searched type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInclude {
    pub include_type: IncludeType,
    pub relationship: &'static Relationship,
}

impl ResolvedInclude {
    /// External type of the records this include yields.
    pub fn yields_type(&self) -> &'static str {
        match self.include_type {
            IncludeType::Include => self.relationship.target_type,
            IncludeType::Revinclude => self.relationship.source_type,
        }
    }

    /// Query for the ids of included records, given the ids of one result
    /// page. Voided records are never included.
    pub fn select_for(&self, page_ids: &[String]) -> SqlFragment {
        let r = self.relationship;
        let placeholders = vec!["?"; page_ids.len()].join(", ");
        let params = page_ids.iter().map(SqlParam::string).collect();

        let sql = match self.include_type {
            IncludeType::Include => format!(
                "SELECT DISTINCT t.id FROM {target} t JOIN {source} s ON s.{column} = t.id \
                 WHERE s.id IN ({placeholders}) AND t.voided = 0 ORDER BY t.id ASC",
                target = r.target_table,
                source = r.source_table,
                column = r.reference_column,
            ),
            IncludeType::Revinclude => format!(
                "SELECT DISTINCT s.id FROM {source} s \
                 WHERE s.{column} IN ({placeholders}) AND s.voided = 0 ORDER BY s.id ASC",
                source = r.source_table,
                column = r.reference_column,
            ),
        };
        SqlFragment::with_params(sql, params)
    }
}
