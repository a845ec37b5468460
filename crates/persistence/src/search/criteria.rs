//! The criteria builder: turns a [`SearchParameterMap`] into a
//! [`ResolvedQuery`].
//!
//! The algorithm is fixed here; what a kind means for a particular record
//! type is supplied through [`SearchHooks`]. A hook that returns `None` leaves
//! its kind out of the query.

use tracing::{debug, trace};

use crate::error::{SearchError, StorageResult};
use crate::types::{
    DateRangeParam, IncludeParam, ReferenceAndListParam, SearchEntry, SearchKind,
    SearchParameterMap, SearchValue, StringAndListParam, TokenAndListParam,
};

use super::fragment::{SqlFragment, SqlParam};
use super::handlers::DateHandler;
use super::relationships::{IncludeType, ResolvedInclude, find_relationship};

/// Per-record-type knowledge the builder needs.
pub trait SearchHooks: Send + Sync {
    /// External resource type answered by this search.
    fn resource_type(&self) -> &'static str;

    /// Table the result ids come from.
    fn base_table(&self) -> &'static str;

    fn id_column(&self) -> &'static str {
        "id"
    }

    /// Soft-delete flag; flagged rows never match.
    fn voided_column(&self) -> Option<&'static str> {
        Some("voided")
    }

    /// Column consulted by `_lastUpdated`.
    fn last_updated_column(&self) -> Option<&'static str> {
        None
    }

    fn handle_date(
        &self,
        _kind: SearchKind,
        _property: Option<&str>,
        _range: &DateRangeParam,
    ) -> Option<SqlFragment> {
        None
    }

    fn handle_token(&self, _kind: SearchKind, _tokens: &TokenAndListParam) -> Option<SqlFragment> {
        None
    }

    fn handle_string(
        &self,
        _kind: SearchKind,
        _strings: &StringAndListParam,
    ) -> Option<SqlFragment> {
        None
    }

    fn handle_reference(
        &self,
        _kind: SearchKind,
        _references: &ReferenceAndListParam,
    ) -> Option<SqlFragment> {
        None
    }
}

/// A search ready to run: a filter over one table plus the includes to
/// resolve for each page.
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub resource_type: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub filter: SqlFragment,
    pub includes: Vec<ResolvedInclude>,
}

impl ResolvedQuery {
    /// Distinct matching ids in stable order.
    pub fn select(&self) -> SqlFragment {
        let (table, id) = (self.table, self.id_column);
        SqlFragment::with_params(
            format!(
                "SELECT DISTINCT {table}.{id} FROM {table} WHERE {} ORDER BY {table}.{id} ASC",
                self.filter.as_condition()
            ),
            self.filter.params.clone(),
        )
    }

    /// Number of distinct matching ids.
    pub fn count(&self) -> SqlFragment {
        let (table, id) = (self.table, self.id_column);
        SqlFragment::with_params(
            format!(
                "SELECT COUNT(DISTINCT {table}.{id}) FROM {table} WHERE {}",
                self.filter.as_condition()
            ),
            self.filter.params.clone(),
        )
    }
}

/// Builds queries for one record type.
#[derive(Debug, Clone, Default)]
pub struct CriteriaBuilder<H> {
    hooks: H,
}

impl<H: SearchHooks> CriteriaBuilder<H> {
    pub fn new(hooks: H) -> Self {
        Self { hooks }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Resolves a map into a query.
    ///
    /// Kinds are visited in the order they first appear in the map and every
    /// entry's condition is AND-ed into the filter. Include directives are
    /// collected for the page pass and never filter.
    ///
    /// Fails only for an include relationship this record type cannot follow.
    pub fn resolve(&self, map: SearchParameterMap) -> StorageResult<ResolvedQuery> {
        let table = self.hooks.base_table();
        let mut filter = SqlFragment::default();
        if let Some(voided) = self.hooks.voided_column() {
            filter = filter.and(SqlFragment::with_params(
                format!("{table}.{voided} = ?"),
                vec![SqlParam::integer(0)],
            ));
        }

        let mut includes = Vec::new();
        for kind in map.kinds() {
            for entry in map.entries_of(kind) {
                if let SearchValue::Include(set) = &entry.value {
                    for include in &set.includes {
                        includes.push(self.resolve_include(kind, include)?);
                    }
                    continue;
                }
                match self.apply(entry) {
                    Some(condition) => filter = filter.and(condition),
                    None => debug!(
                        resource_type = self.hooks.resource_type(),
                        kind = %kind,
                        "Search parameter not handled; ignoring"
                    ),
                }
            }
        }

        let query = ResolvedQuery {
            resource_type: self.hooks.resource_type(),
            table,
            id_column: self.hooks.id_column(),
            filter,
            includes,
        };
        trace!(sql = %query.filter.sql, params = query.filter.params.len(), "Resolved search");
        Ok(query)
    }

    fn apply(&self, entry: &SearchEntry) -> Option<SqlFragment> {
        let kind = entry.kind;
        match &entry.value {
            SearchValue::Date(range) if kind == SearchKind::LastUpdated => {
                let column = self.hooks.last_updated_column()?;
                DateHandler::build_sql(range, &format!("{}.{column}", self.hooks.base_table()))
            }
            SearchValue::Date(range) => self.hooks.handle_date(kind, entry.property.as_deref(), range),
            SearchValue::Token(tokens) => self.hooks.handle_token(kind, tokens),
            SearchValue::String(strings) => self.hooks.handle_string(kind, strings),
            SearchValue::Reference(references) => self.hooks.handle_reference(kind, references),
            SearchValue::Include(_) => None,
        }
    }

    fn resolve_include(
        &self,
        kind: SearchKind,
        include: &IncludeParam,
    ) -> StorageResult<ResolvedInclude> {
        let (include_type, operation) = match kind {
            SearchKind::RevInclude => (IncludeType::Revinclude, "_revinclude"),
            _ => (IncludeType::Include, "_include"),
        };
        let searched = self.hooks.resource_type();
        let relationship = find_relationship(include).filter(|r| match include_type {
            IncludeType::Include => r.source_type == searched,
            IncludeType::Revinclude => r.target_type == searched,
        });

        match relationship {
            Some(relationship) => Ok(ResolvedInclude {
                include_type,
                relationship,
            }),
            None => Err(SearchError::UnsupportedRelationship {
                operation: operation.to_string(),
                relationship: include.to_string(),
            }
            .into()),
        }
    }
}
