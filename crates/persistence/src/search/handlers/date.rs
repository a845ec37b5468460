//! Date parameter SQL handler.

use crate::types::DateRangeParam;

use super::super::fragment::{SqlFragment, SqlParam};

/// Handles date parameter SQL generation.
pub struct DateHandler;

impl DateHandler {
    /// Builds an inclusive range condition on `column`.
    ///
    /// Returns `None` for a range with neither bound. A record whose column
    /// is NULL never matches a bounded range.
    pub fn build_sql(range: &DateRangeParam, column: &str) -> Option<SqlFragment> {
        let lower = range.lower.map(|lower| {
            SqlFragment::with_params(format!("{column} >= ?"), vec![SqlParam::timestamp(&lower)])
        });
        let upper = range.upper.map(|upper| {
            SqlFragment::with_params(format!("{column} <= ?"), vec![SqlParam::timestamp(&upper)])
        });

        match (lower, upper) {
            (Some(lower), Some(upper)) => Some(lower.and(upper)),
            (lower, upper) => lower.or(upper),
        }
    }
}
