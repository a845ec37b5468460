//! String parameter SQL handler.

use crate::types::{StringMatch, StringParam};

use super::super::fragment::{SqlFragment, SqlParam};

/// Handles string parameter SQL generation.
pub struct StringHandler;

impl StringHandler {
    /// Builds SQL for a string parameter value against one column.
    ///
    /// Default behavior is case-insensitive prefix match; `Contains` is a
    /// case-insensitive substring match and `Exact` is case-sensitive
    /// equality.
    pub fn build_sql(param: &StringParam, column: &str) -> SqlFragment {
        match param.mode {
            StringMatch::Exact => SqlFragment::with_params(
                format!("{column} = ?"),
                vec![SqlParam::string(&param.value)],
            ),
            StringMatch::Contains => SqlFragment::with_params(
                format!("{column} LIKE ? ESCAPE '\\'"),
                vec![SqlParam::string(format!("%{}%", escape_like(&param.value)))],
            ),
            StringMatch::StartsWith => SqlFragment::with_params(
                format!("{column} LIKE ? ESCAPE '\\'"),
                vec![SqlParam::string(format!("{}%", escape_like(&param.value)))],
            ),
        }
    }

    /// Same condition applied to several columns, any of which may match.
    pub fn build_any(param: &StringParam, columns: &[&str]) -> Option<SqlFragment> {
        columns
            .iter()
            .map(|column| Self::build_sql(param, column))
            .reduce(SqlFragment::or)
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
