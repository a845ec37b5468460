//! Search parameters extractor.
//!
//! Turns a query string into a [`SearchParameterMap`]:
//!
//! - a comma inside one value separates alternatives (OR);
//! - repeating a parameter adds another condition (AND);
//! - `:not` negates a token, `:contains` and `:exact` change string
//!   matching, and `patient:Patient` restricts a reference's target type;
//! - `patient.name=...` chains through the referenced patient;
//! - dates accept the prefixes `eq`, `gt`, `lt`, `ge` and `le`.
//!
//! Unknown parameters are ignored. `_count` and `_offset` control paging
//! and never reach the map.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use carebridge_persistence::types::{
    AndListParam, DateRangeParam, IncludeParam, IncludeSet, ReferenceParam, SearchKind,
    SearchParameterMap, StringMatch, StringParam, TokenParam,
};
use tracing::debug;

use crate::error::{RestError, RestResult};

/// Parameters that shape the response rather than select records.
const RESULT_PARAMS: &[&str] = &["_count", "_offset", "_format", "_pretty"];

/// Axum extractor for search query strings.
///
/// Keeps the raw `(name, value)` pairs in request order so repeated
/// parameters survive.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    params: Vec<(String, String)>,
    count: Option<usize>,
    offset: Option<usize>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the params from decoded pairs.
    pub fn from_pairs(params: Vec<(String, String)>) -> RestResult<Self> {
        let count = parse_usize(&params, "_count")?;
        let offset = parse_usize(&params, "_offset")?;
        Ok(Self {
            params,
            count,
            offset,
        })
    }

    /// Requested page size (`_count`).
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Requested start position (`_offset`).
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }

    /// Pairs that select records, excluding paging and format controls.
    pub fn search_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter(|(name, _)| !RESULT_PARAMS.contains(&name.as_str()))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Parses the selecting pairs into a typed map.
    pub fn to_parameter_map(&self) -> RestResult<SearchParameterMap> {
        let mut map = SearchParameterMap::new();
        for (raw_name, value) in self.search_pairs() {
            if value.is_empty() {
                debug!(parameter = raw_name, "Ignoring empty search parameter");
                continue;
            }
            map = add_parameter(map, raw_name, value)?;
        }
        Ok(map)
    }
}

fn parse_usize(params: &[(String, String)], name: &str) -> RestResult<Option<usize>> {
    params
        .iter()
        .rev()
        .find(|(n, _)| n == name)
        .map(|(_, v)| {
            v.parse()
                .map_err(|_| RestError::invalid(format!("{name} must be a non-negative integer")))
        })
        .transpose()
}

/// Alternatives of one value; empty alternatives are dropped.
fn alternatives(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn unsupported_modifier(name: &str, modifier: &str) -> RestError {
    RestError::invalid(format!("Unsupported modifier :{modifier} on parameter {name}"))
}

fn add_parameter(
    map: SearchParameterMap,
    raw_name: &str,
    value: &str,
) -> RestResult<SearchParameterMap> {
    let (name, modifier) = match raw_name.split_once(':') {
        Some((name, modifier)) => (name, Some(modifier)),
        None => (raw_name, None),
    };

    if let Some((reference, chain)) = name.split_once('.') {
        return add_chain(map, raw_name, reference, chain, value);
    }

    let Some(kind) = SearchKind::from_param_name(name) else {
        debug!(parameter = raw_name, "Ignoring unknown search parameter");
        return Ok(map);
    };

    match kind {
        SearchKind::Date | SearchKind::LastUpdated => {
            if let Some(modifier) = modifier {
                return Err(unsupported_modifier(name, modifier));
            }
            let range = DateRangeParam::from_prefixed(name, &[value])
                .map_err(|e| RestError::invalid(e.to_string()))?;
            Ok(map.with_date(kind, range))
        }
        SearchKind::Identifier | SearchKind::Type => {
            let negate = match modifier {
                None => false,
                Some("not") => true,
                Some(other) => return Err(unsupported_modifier(name, other)),
            };
            let tokens: Vec<TokenParam> = alternatives(value)
                .map(TokenParam::parse)
                .map(|t| if negate { t.negated() } else { t })
                .collect();
            if tokens.is_empty() {
                return Ok(map);
            }
            Ok(map.with_tokens(kind, AndListParam::new().and(tokens)))
        }
        SearchKind::Name
        | SearchKind::Given
        | SearchKind::Family
        | SearchKind::AddressCity
        | SearchKind::AddressState
        | SearchKind::AddressPostalCode
        | SearchKind::AddressCountry => {
            let mode = match modifier {
                None => StringMatch::StartsWith,
                Some("contains") => StringMatch::Contains,
                Some("exact") => StringMatch::Exact,
                Some(other) => return Err(unsupported_modifier(name, other)),
            };
            let strings: Vec<StringParam> = alternatives(value)
                .map(|v| StringParam::new(v).with_mode(mode))
                .collect();
            if strings.is_empty() {
                return Ok(map);
            }
            Ok(map.with_strings(kind, AndListParam::new().and(strings)))
        }
        SearchKind::Patient => {
            let references: Vec<ReferenceParam> = alternatives(value)
                .map(|v| {
                    let reference = ReferenceParam::parse(v);
                    match modifier {
                        Some(target_type) => reference.with_target_type(target_type),
                        None => reference,
                    }
                })
                .collect();
            if references.is_empty() {
                return Ok(map);
            }
            Ok(map.with_references(kind, AndListParam::new().and(references)))
        }
        SearchKind::Include | SearchKind::RevInclude => {
            let includes = alternatives(value)
                .map(|v| {
                    IncludeParam::parse(v).ok_or_else(|| {
                        RestError::invalid(format!("Malformed {name} value '{v}'"))
                    })
                })
                .collect::<RestResult<Vec<_>>>()?;
            Ok(map.with_includes(kind, IncludeSet::new(includes)))
        }
    }
}

fn add_chain(
    map: SearchParameterMap,
    raw_name: &str,
    reference: &str,
    chain: &str,
    value: &str,
) -> RestResult<SearchParameterMap> {
    if SearchKind::from_param_name(reference) != Some(SearchKind::Patient) {
        return Err(RestError::invalid(format!(
            "Chained parameter {raw_name} does not start at a reference"
        )));
    }
    let references: Vec<ReferenceParam> = alternatives(value)
        .map(|v| ReferenceParam::chained(chain, v))
        .collect();
    if references.is_empty() {
        return Ok(map);
    }
    Ok(map.with_references(SearchKind::Patient, AndListParam::new().and(references)))
}

impl<S> FromRequestParts<S> for SearchParams
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| RestError::invalid(format!("Invalid query parameters: {}", e)))?;

        SearchParams::from_pairs(params)
    }
}
