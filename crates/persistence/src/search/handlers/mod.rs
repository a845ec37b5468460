//! Per-kind SQL handlers shared by the concrete search builders.
//!
//! Each handler turns one typed parameter value into a condition against
//! columns the caller names; the builders decide which columns apply.

mod date;
mod reference;
mod string;
mod token;

pub use date::DateHandler;
pub use reference::{ChainResolver, ReferenceHandler, ReferenceTarget};
pub use string::StringHandler;
pub use token::{TokenHandler, TokenTarget};

use crate::types::AndListParam;

use super::fragment::SqlFragment;

/// Composes an AND-list of OR-lists into one condition.
///
/// Values `build` declines are skipped; an OR-list left with nothing is
/// dropped from the conjunction. Returns `None` when nothing remains.
pub fn and_of_ors<T>(
    clauses: &AndListParam<T>,
    mut build: impl FnMut(&T) -> Option<SqlFragment>,
) -> Option<SqlFragment> {
    let mut conjunction: Option<SqlFragment> = None;
    for clause in clauses.iter() {
        let disjunction = clause
            .iter()
            .filter_map(&mut build)
            .reduce(SqlFragment::or);
        if let Some(disjunction) = disjunction {
            conjunction = Some(match conjunction {
                Some(existing) => existing.and(disjunction),
                None => disjunction,
            });
        }
    }
    conjunction
}
