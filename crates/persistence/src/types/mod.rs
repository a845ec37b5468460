//! Core types for the persistence layer.
//!
//! - [`SearchParameterMap`] and the typed parameter values it carries
//! - [`SearchPage`] - ordered result identifiers with the total match count
//! - [`IncludedRef`] - a record reached through an include relationship

mod search_params;

pub use search_params::{
    AndListParam, DateRangeParam, IncludeParam, IncludeSet, OrListParam, ReferenceAndListParam,
    ReferenceOrListParam, ReferenceParam, SearchEntry, SearchKind, SearchParameterMap,
    SearchPrefix, SearchValue, StringAndListParam, StringMatch, StringOrListParam, StringParam,
    TokenAndListParam, TokenOrListParam, TokenParam,
};

/// Identifiers matched by a search, in result order, plus the total count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub ids: Vec<String>,
    pub total: usize,
}

/// A record pulled in by an `_include`/`_revinclude` pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IncludedRef {
    /// External resource type of the included record.
    pub resource_type: String,
    pub id: String,
}
