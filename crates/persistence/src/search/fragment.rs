//! SQL fragments with positional parameters.
//!
//! Fragments use anonymous `?` placeholders, so parameters bind in the order
//! they appear in the text. Combining fragments concatenates both the SQL and
//! the parameter lists in the same order, which keeps them aligned without any
//! placeholder renumbering.

use chrono::{DateTime, SecondsFormat, Utc};

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    /// The SQL clause.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Creates a timestamp parameter in the stored text encoding.
    pub fn timestamp(instant: &DateTime<Utc>) -> Self {
        SqlParam::String(timestamp_text(instant))
    }
}

/// Fixed-width UTC text encoding for stored timestamps.
///
/// Every value has the same length and zone suffix, so string comparison
/// orders them chronologically.
pub fn timestamp_text(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl SqlFragment {
    /// Creates a new SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A condition no row satisfies.
    pub fn never() -> Self {
        Self::new("1 = 0")
    }

    /// Combines with another fragment using AND.
    pub fn and(mut self, other: SqlFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({}) AND ({})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Combines with another fragment using OR.
    pub fn or(mut self, other: SqlFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({}) OR ({})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Wraps the condition in `NOT (...)`.
    pub fn negate(self) -> Self {
        Self {
            sql: format!("NOT ({})", self.sql),
            params: self.params,
        }
    }

    /// Returns true if this fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// The SQL text, with an always-true condition standing in for an empty
    /// fragment.
    pub fn as_condition(&self) -> &str {
        if self.sql.is_empty() { "1 = 1" } else { &self.sql }
    }

    /// Number of `?` placeholders in the text.
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_and_keeps_param_order() {
        let frag = SqlFragment::with_params("a = ?", vec![SqlParam::string("1")])
            .and(SqlFragment::with_params("b = ?", vec![SqlParam::string("2")]));

        assert_eq!(frag.sql, "(a = ?) AND (b = ?)");
        assert_eq!(frag.params, vec![SqlParam::string("1"), SqlParam::string("2")]);
    }

    #[test]
    fn test_empty_side_is_absorbed() {
        let frag = SqlFragment::new("").or(SqlFragment::new("x = 1"));
        assert_eq!(frag.sql, "x = 1");

        let frag = SqlFragment::new("x = 1").and(SqlFragment::new(""));
        assert_eq!(frag.sql, "x = 1");
    }

    #[test]
    fn test_negate() {
        let frag = SqlFragment::with_params("a = ?", vec![SqlParam::integer(1)]).negate();
        assert_eq!(frag.sql, "NOT (a = ?)");
        assert_eq!(frag.placeholder_count(), frag.params.len());
    }

    #[test]
    fn test_as_condition_defaults_to_true() {
        assert_eq!(SqlFragment::default().as_condition(), "1 = 1");
    }

    #[test]
    fn test_timestamp_text_is_fixed_width() {
        let a = timestamp_text(&Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let b = timestamp_text(&Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 1).unwrap());
        assert_eq!(a, "2020-01-01T00:00:00.000000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
