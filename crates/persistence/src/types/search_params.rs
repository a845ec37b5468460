//! Typed search parameters and the [`SearchParameterMap`] that carries them.
//!
//! A map is built once per request from the query string, then handed by
//! value to a [`CriteriaBuilder`](crate::search::CriteriaBuilder), which
//! resolves it into SQL.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The kinds of search parameter the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchKind {
    Identifier,
    Name,
    Given,
    Family,
    AddressCity,
    AddressState,
    AddressPostalCode,
    AddressCountry,
    LastUpdated,
    Date,
    Type,
    Patient,
    Include,
    RevInclude,
}

impl SearchKind {
    /// The query-string name of the parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Identifier => "identifier",
            SearchKind::Name => "name",
            SearchKind::Given => "given",
            SearchKind::Family => "family",
            SearchKind::AddressCity => "address-city",
            SearchKind::AddressState => "address-state",
            SearchKind::AddressPostalCode => "address-postalcode",
            SearchKind::AddressCountry => "address-country",
            SearchKind::LastUpdated => "_lastUpdated",
            SearchKind::Date => "date",
            SearchKind::Type => "type",
            SearchKind::Patient => "patient",
            SearchKind::Include => "_include",
            SearchKind::RevInclude => "_revinclude",
        }
    }

    /// Looks a kind up by its query-string name.
    pub fn from_param_name(name: &str) -> Option<Self> {
        let kind = match name {
            "identifier" => SearchKind::Identifier,
            "name" => SearchKind::Name,
            "given" => SearchKind::Given,
            "family" => SearchKind::Family,
            "address-city" => SearchKind::AddressCity,
            "address-state" => SearchKind::AddressState,
            "address-postalcode" => SearchKind::AddressPostalCode,
            "address-country" => SearchKind::AddressCountry,
            "_lastUpdated" => SearchKind::LastUpdated,
            "date" => SearchKind::Date,
            "type" => SearchKind::Type,
            "patient" => SearchKind::Patient,
            "_include" => SearchKind::Include,
            "_revinclude" => SearchKind::RevInclude,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AND / OR lists
// ---------------------------------------------------------------------------

/// Alternatives for one occurrence of a parameter (comma-separated values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrListParam<T> {
    pub values: Vec<T>,
}

impl<T> OrListParam<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> From<Vec<T>> for OrListParam<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

/// Conjunction of OR-lists (repeated occurrences of a parameter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndListParam<T> {
    pub clauses: Vec<OrListParam<T>>,
}

impl<T> Default for AndListParam<T> {
    fn default() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }
}

impl<T> AndListParam<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single clause holding a single value.
    pub fn single(value: T) -> Self {
        Self::new().and(vec![value])
    }

    /// Adds an OR-clause that must hold alongside the existing ones.
    pub fn and(mut self, clause: impl Into<OrListParam<T>>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrListParam<T>> {
        self.clauses.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.iter().all(OrListParam::is_empty)
    }
}

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

/// Comparison prefixes accepted on date parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPrefix {
    /// Equal (default).
    #[default]
    Eq,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Ge,
    /// Less than or equal.
    Le,
}

impl FromStr for SearchPrefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eq" => Ok(SearchPrefix::Eq),
            "gt" => Ok(SearchPrefix::Gt),
            "lt" => Ok(SearchPrefix::Lt),
            "ge" => Ok(SearchPrefix::Ge),
            "le" => Ok(SearchPrefix::Le),
            _ => Err(format!("unknown search prefix: {}", s)),
        }
    }
}

impl SearchPrefix {
    /// Extracts a prefix from the beginning of a value string.
    ///
    /// Returns the prefix and the remaining value.
    pub fn extract(value: &str) -> (Self, &str) {
        if let Some(prefix) = value.get(..2) {
            if let Ok(p) = prefix.parse() {
                return (p, &value[2..]);
            }
        }
        (SearchPrefix::Eq, value)
    }
}

/// Smallest step between stored timestamps.
fn tick() -> Duration {
    Duration::nanoseconds(1)
}

/// An inclusive range of instants; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeParam {
    pub lower: Option<DateTime<Utc>>,
    pub upper: Option<DateTime<Utc>>,
}

impl DateRangeParam {
    pub fn new(lower: Option<DateTime<Utc>>, upper: Option<DateTime<Utc>>) -> Self {
        Self { lower, upper }
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Builds a range from prefixed values such as `ge2020-01-01`.
    ///
    /// Each value narrows the range. A value is read at the precision it was
    /// written with, so `eq2020-01` covers the whole of January and
    /// `gt2020-01-01` starts the next day.
    pub fn from_prefixed<S: AsRef<str>>(
        parameter: &str,
        values: &[S],
    ) -> Result<Self, ValidationError> {
        let mut range = DateRangeParam::default();
        for raw in values {
            let (prefix, text) = SearchPrefix::extract(raw.as_ref());
            let (start, end) =
                parse_date_span(text).ok_or_else(|| ValidationError::InvalidSearchParameter {
                    parameter: parameter.to_string(),
                    message: format!("unparseable date '{}'", raw.as_ref()),
                })?;
            match prefix {
                SearchPrefix::Eq => {
                    range.narrow_lower(start);
                    range.narrow_upper(end);
                }
                SearchPrefix::Ge => range.narrow_lower(start),
                SearchPrefix::Gt => range.narrow_lower(end + tick()),
                SearchPrefix::Le => range.narrow_upper(end),
                SearchPrefix::Lt => range.narrow_upper(start - tick()),
            }
        }
        Ok(range)
    }

    fn narrow_lower(&mut self, bound: DateTime<Utc>) {
        self.lower = Some(self.lower.map_or(bound, |cur| cur.max(bound)));
    }

    fn narrow_upper(&mut self, bound: DateTime<Utc>) {
        self.upper = Some(self.upper.map_or(bound, |cur| cur.min(bound)));
    }
}

/// Parses a FHIR date/dateTime into the first and last instant it covers.
fn parse_date_span(text: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        let instant = dt.with_timezone(&Utc);
        return Some((instant, instant));
    }

    let mut parts = text.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: Option<u32> = parts.next().map(str::parse::<u32>).transpose().ok()?;
    let day: Option<u32> = parts.next().map(str::parse::<u32>).transpose().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let start = NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))?;
    let next = match (month, day) {
        (_, Some(_)) => start.succ_opt()?,
        (Some(m), None) if m == 12 => NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
        (Some(m), None) => NaiveDate::from_ymd_opt(year, m + 1, 1)?,
        (None, _) => NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
    };
    let start = start.and_hms_opt(0, 0, 0)?.and_utc();
    let end = next.and_hms_opt(0, 0, 0)?.and_utc() - tick();
    Some((start, end))
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A coded value, optionally qualified by its system.
///
/// `system` is `None` for a bare `code` (any system), `Some("")` for
/// `|code` (local codes only), and `Some(uri)` for `uri|code`. An empty
/// code with a system matches every code in that system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParam {
    pub system: Option<String>,
    pub code: String,
    pub not: bool,
}

impl TokenParam {
    pub fn new(system: Option<&str>, code: &str) -> Self {
        Self {
            system: system.map(str::to_string),
            code: code.to_string(),
            not: false,
        }
    }

    /// Parses `system|code`, `|code` or `code`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('|') {
            Some((system, code)) => Self::new(Some(system), code),
            None => Self::new(None, raw),
        }
    }

    pub fn negated(mut self) -> Self {
        self.not = true;
        self
    }
}

pub type TokenOrListParam = OrListParam<TokenParam>;
pub type TokenAndListParam = AndListParam<TokenParam>;

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

/// How a string parameter is compared. Prefix and substring matching
/// ignore ASCII case; exact matching does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringMatch {
    #[default]
    StartsWith,
    Contains,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringParam {
    pub value: String,
    pub mode: StringMatch,
}

impl StringParam {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            mode: StringMatch::StartsWith,
        }
    }

    pub fn with_mode(mut self, mode: StringMatch) -> Self {
        self.mode = mode;
        self
    }
}

pub type StringOrListParam = OrListParam<StringParam>;
pub type StringAndListParam = AndListParam<StringParam>;

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

/// A reference parameter, either direct (`Patient/123`, `123`) or chained
/// (`patient.name=Smith`, where `chain` is `name` and `id_part` is the value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceParam {
    pub target_type: Option<String>,
    pub id_part: String,
    pub chain: Option<String>,
}

impl ReferenceParam {
    /// Parses `Type/id` or a bare id.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_end_matches('/');
        let mut segments = trimmed.rsplit('/');
        let id_part = segments.next().unwrap_or_default().to_string();
        let target_type = segments
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            target_type,
            id_part,
            chain: None,
        }
    }

    pub fn chained(chain: &str, value: &str) -> Self {
        Self {
            target_type: None,
            id_part: value.to_string(),
            chain: Some(chain.to_string()),
        }
    }

    pub fn with_target_type(mut self, target_type: &str) -> Self {
        self.target_type = Some(target_type.to_string());
        self
    }
}

pub type ReferenceOrListParam = OrListParam<ReferenceParam>;
pub type ReferenceAndListParam = AndListParam<ReferenceParam>;

// ---------------------------------------------------------------------------
// Include
// ---------------------------------------------------------------------------

/// An `_include`/`_revinclude` directive: `Source:relationship[:Target]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncludeParam {
    pub source_type: String,
    pub relationship: String,
    pub target_type: Option<String>,
}

impl IncludeParam {
    pub fn new(source_type: &str, relationship: &str) -> Self {
        Self {
            source_type: source_type.to_string(),
            relationship: relationship.to_string(),
            target_type: None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(':');
        let source_type = parts.next().filter(|s| !s.is_empty())?;
        let relationship = parts.next().filter(|s| !s.is_empty())?;
        let target_type = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            source_type: source_type.to_string(),
            relationship: relationship.to_string(),
            target_type,
        })
    }
}

impl fmt::Display for IncludeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.relationship)?;
        if let Some(target) = &self.target_type {
            write!(f, ":{}", target)?;
        }
        Ok(())
    }
}

/// A set of include directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeSet {
    pub includes: Vec<IncludeParam>,
}

impl IncludeSet {
    pub fn new(includes: Vec<IncludeParam>) -> Self {
        Self { includes }
    }
}

// ---------------------------------------------------------------------------
// The map
// ---------------------------------------------------------------------------

/// A typed value held by one map entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchValue {
    Date(DateRangeParam),
    Token(TokenAndListParam),
    String(StringAndListParam),
    Reference(ReferenceAndListParam),
    Include(IncludeSet),
}

/// One `(kind, property, value)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub kind: SearchKind,
    /// Which field of the searched record the value applies to, when the
    /// kind alone does not say.
    pub property: Option<String>,
    pub value: SearchValue,
}

/// Ordered collection of search entries.
///
/// Insertion order is kept so the generated SQL is reproducible. Entries are
/// AND-composed, so the order never changes which records match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameterMap {
    entries: Vec<SearchEntry>,
}

impl SearchParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn with(self, kind: SearchKind, value: SearchValue) -> Self {
        self.with_property(kind, None, value)
    }

    /// Adds an entry bound to a named property.
    pub fn with_property(
        mut self,
        kind: SearchKind,
        property: Option<&str>,
        value: SearchValue,
    ) -> Self {
        self.entries.push(SearchEntry {
            kind,
            property: property.map(str::to_string),
            value,
        });
        self
    }

    pub fn with_date(self, kind: SearchKind, range: DateRangeParam) -> Self {
        self.with(kind, SearchValue::Date(range))
    }

    pub fn with_tokens(self, kind: SearchKind, tokens: TokenAndListParam) -> Self {
        self.with(kind, SearchValue::Token(tokens))
    }

    pub fn with_strings(self, kind: SearchKind, strings: StringAndListParam) -> Self {
        self.with(kind, SearchValue::String(strings))
    }

    pub fn with_references(self, kind: SearchKind, references: ReferenceAndListParam) -> Self {
        self.with(kind, SearchValue::Reference(references))
    }

    pub fn with_includes(self, kind: SearchKind, includes: IncludeSet) -> Self {
        self.with(kind, SearchValue::Include(includes))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Distinct kinds, in the order each first appeared.
    pub fn kinds(&self) -> Vec<SearchKind> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| e.kind)
            .filter(|k| seen.insert(*k))
            .collect()
    }

    /// Entries of one kind, in insertion order.
    pub fn entries_of(&self, kind: SearchKind) -> impl Iterator<Item = &SearchEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}
