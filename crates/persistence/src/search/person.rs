//! Search hooks for persons (`Patient`).

use crate::types::{
    SearchKind, StringAndListParam, StringParam, TokenAndListParam, TokenParam,
};

use super::criteria::SearchHooks;
use super::fragment::SqlFragment;
use super::handlers::{StringHandler, TokenHandler, TokenTarget, and_of_ors};

const IDENTIFIER_TARGET: TokenTarget<'static> = TokenTarget {
    scope: "SELECT 1 FROM person_identifier pi WHERE pi.person_id = person.id",
    system_column: "pi.system",
    code_column: "pi.value",
};

/// Searches the `person` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonSearch;

impl PersonSearch {
    /// Columns a string kind applies to; `name` spans both name parts.
    fn string_columns(kind: SearchKind) -> Option<&'static [&'static str]> {
        let columns: &'static [&'static str] = match kind {
            SearchKind::Name => &["person.given_name", "person.family_name"],
            SearchKind::Given => &["person.given_name"],
            SearchKind::Family => &["person.family_name"],
            SearchKind::AddressCity => &["person.city"],
            SearchKind::AddressState => &["person.state"],
            SearchKind::AddressPostalCode => &["person.postal_code"],
            SearchKind::AddressCountry => &["person.country"],
            _ => return None,
        };
        Some(columns)
    }

    /// Condition on the `person` table for a chained property, as used by
    /// `patient.name=...` on other record types.
    pub fn chain_condition(property: &str, value: &str) -> Option<SqlFragment> {
        if property == SearchKind::Identifier.as_str() {
            return Some(TokenHandler::build_sql(&TokenParam::parse(value), &IDENTIFIER_TARGET));
        }
        let kind = SearchKind::from_param_name(property)?;
        let columns = Self::string_columns(kind)?;
        StringHandler::build_any(&StringParam::new(value), columns)
    }
}

impl SearchHooks for PersonSearch {
    fn resource_type(&self) -> &'static str {
        "Patient"
    }

    fn base_table(&self) -> &'static str {
        "person"
    }

    fn last_updated_column(&self) -> Option<&'static str> {
        Some("last_updated")
    }

    fn handle_token(&self, kind: SearchKind, tokens: &TokenAndListParam) -> Option<SqlFragment> {
        match kind {
            SearchKind::Identifier => and_of_ors(tokens, |token| {
                Some(TokenHandler::build_sql(token, &IDENTIFIER_TARGET))
            }),
            _ => None,
        }
    }

    fn handle_string(&self, kind: SearchKind, strings: &StringAndListParam) -> Option<SqlFragment> {
        let columns = Self::string_columns(kind)?;
        and_of_ors(strings, |param| StringHandler::build_any(param, columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::CriteriaBuilder;
    use crate::types::{SearchParameterMap, StringMatch};

    #[test]
    fn test_name_spans_given_and_family() {
        let map = SearchParameterMap::new()
            .with_strings(SearchKind::Name, StringAndListParam::single(StringParam::new("Jo")));
        let query = CriteriaBuilder::new(PersonSearch).resolve(map).unwrap();

        assert!(query.filter.sql.contains("person.given_name LIKE ?"));
        assert!(query.filter.sql.contains("person.family_name LIKE ?"));
        assert_eq!(query.filter.placeholder_count(), query.filter.params.len());
    }

    #[test]
    fn test_address_exact() {
        let strings = StringAndListParam::single(
            StringParam::new("Boston").with_mode(StringMatch::Exact),
        );
        let frag = PersonSearch
            .handle_string(SearchKind::AddressCity, &strings)
            .unwrap();
        assert_eq!(frag.sql, "person.city = ?");
    }

    #[test]
    fn test_identifier_token() {
        let tokens = TokenAndListParam::single(TokenParam::parse("urn:mrn|123"));
        let frag = PersonSearch.handle_token(SearchKind::Identifier, &tokens).unwrap();
        assert!(frag.sql.starts_with("EXISTS (SELECT 1 FROM person_identifier pi"));
    }

    #[test]
    fn test_chain_conditions() {
        assert!(PersonSearch::chain_condition("family", "Doe").is_some());
        assert!(PersonSearch::chain_condition("identifier", "123").is_some());
        assert!(PersonSearch::chain_condition("birthdate", "2000").is_none());
        assert!(PersonSearch::chain_condition("_lastUpdated", "2000").is_none());
    }

    #[test]
    fn test_unrelated_kinds_are_not_handled() {
        let tokens = TokenAndListParam::single(TokenParam::parse("x"));
        assert!(PersonSearch.handle_token(SearchKind::Type, &tokens).is_none());
    }
}
