//! Token parameter SQL handler.

use crate::types::TokenParam;

use super::super::fragment::{SqlFragment, SqlParam};

/// Where the codes of a searched record live.
///
/// `scope` is a correlated `SELECT 1 FROM ... WHERE ...` over the rows that
/// hold the record's codes; the handler appends the code condition to it and
/// wraps it in `EXISTS`.
#[derive(Debug, Clone, Copy)]
pub struct TokenTarget<'a> {
    pub scope: &'a str,
    pub system_column: &'a str,
    pub code_column: &'a str,
}

/// Handles token parameter SQL generation.
pub struct TokenHandler;

impl TokenHandler {
    /// Builds SQL for a token parameter value.
    ///
    /// Token values can be:
    /// - `code` - matches any system
    /// - `system|code` - matches specific system and code
    /// - `|code` - matches code with no system (empty or null)
    /// - `system|` - matches any code in system
    ///
    /// A negated token becomes `NOT EXISTS`, so records without any codes
    /// match it.
    pub fn build_sql(token: &TokenParam, target: &TokenTarget<'_>) -> SqlFragment {
        let TokenTarget {
            scope,
            system_column,
            code_column,
        } = *target;

        let condition = match token.system.as_deref() {
            None => SqlFragment::with_params(
                format!("{code_column} = ?"),
                vec![SqlParam::string(&token.code)],
            ),
            Some("") => SqlFragment::with_params(
                format!("({system_column} IS NULL OR {system_column} = '') AND {code_column} = ?"),
                vec![SqlParam::string(&token.code)],
            ),
            Some(system) if token.code.is_empty() => SqlFragment::with_params(
                format!("{system_column} = ?"),
                vec![SqlParam::string(system)],
            ),
            Some(system) => SqlFragment::with_params(
                format!("{system_column} = ? AND {code_column} = ?"),
                vec![SqlParam::string(system), SqlParam::string(&token.code)],
            ),
        };

        let exists = SqlFragment::with_params(
            format!("EXISTS ({scope} AND {})", condition.sql),
            condition.params,
        );
        if token.not { exists.negate() } else { exists }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: TokenTarget<'static> = TokenTarget {
        scope: "SELECT 1 FROM codes c WHERE c.owner_id = t.id",
        system_column: "c.system",
        code_column: "c.code",
    };

    #[test]
    fn test_token_code_only() {
        let frag = TokenHandler::build_sql(&TokenParam::parse("12345"), &TARGET);

        assert_eq!(
            frag.sql,
            "EXISTS (SELECT 1 FROM codes c WHERE c.owner_id = t.id AND c.code = ?)"
        );
        assert_eq!(frag.params, vec![SqlParam::string("12345")]);
    }

    #[test]
    fn test_token_system_and_code() {
        let frag = TokenHandler::build_sql(&TokenParam::parse("http://loinc.org|1234-5"), &TARGET);

        assert!(frag.sql.contains("c.system = ? AND c.code = ?"));
        assert_eq!(frag.params.len(), 2);
    }

    #[test]
    fn test_token_no_system() {
        let frag = TokenHandler::build_sql(&TokenParam::parse("|abc"), &TARGET);
        assert!(frag.sql.contains("c.system IS NULL OR c.system = ''"));
    }

    #[test]
    fn test_token_system_only() {
        let frag = TokenHandler::build_sql(&TokenParam::parse("http://loinc.org|"), &TARGET);
        assert!(frag.sql.contains("c.system = ?"));
        assert!(!frag.sql.contains("c.code"));
    }

    #[test]
    fn test_token_not() {
        let frag = TokenHandler::build_sql(&TokenParam::parse("x").negated(), &TARGET);
        assert!(frag.sql.starts_with("NOT (EXISTS"));
    }
}
