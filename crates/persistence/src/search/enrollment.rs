//! Search hooks for program enrollments (`EpisodeOfCare`).

use tracing::debug;

use crate::types::{DateRangeParam, ReferenceAndListParam, SearchKind, TokenAndListParam};

use super::criteria::SearchHooks;
use super::fragment::SqlFragment;
use super::handlers::{
    DateHandler, ReferenceHandler, ReferenceTarget, TokenHandler, TokenTarget, and_of_ors,
};
use super::person::PersonSearch;

/// Program concept codings: the concept's own local code plus its mappings.
const TYPE_TARGET: TokenTarget<'static> = TokenTarget {
    scope: "SELECT 1 FROM program p JOIN concept_coding cc ON cc.concept_id = p.concept_id \
            WHERE p.id = enrollment.program_id",
    system_column: "cc.system",
    code_column: "cc.code",
};

/// Searches the `enrollment` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentSearch;

impl EnrollmentSearch {
    /// Property names accepted on `date` entries and the column each reads.
    fn date_column(property: Option<&str>) -> Option<&'static str> {
        match property {
            None | Some("date_enrolled") => Some("enrollment.date_enrolled"),
            Some("date_completed") => Some("enrollment.date_completed"),
            Some(_) => None,
        }
    }
}

impl SearchHooks for EnrollmentSearch {
    fn resource_type(&self) -> &'static str {
        "EpisodeOfCare"
    }

    fn base_table(&self) -> &'static str {
        "enrollment"
    }

    fn last_updated_column(&self) -> Option<&'static str> {
        Some("last_updated")
    }

    fn handle_date(
        &self,
        kind: SearchKind,
        property: Option<&str>,
        range: &DateRangeParam,
    ) -> Option<SqlFragment> {
        if kind != SearchKind::Date {
            return None;
        }
        let Some(column) = Self::date_column(property) else {
            debug!(property, "Unknown date property on enrollment search");
            return None;
        };
        DateHandler::build_sql(range, column)
    }

    fn handle_token(&self, kind: SearchKind, tokens: &TokenAndListParam) -> Option<SqlFragment> {
        match kind {
            SearchKind::Type => and_of_ors(tokens, |token| {
                Some(TokenHandler::build_sql(token, &TYPE_TARGET))
            }),
            _ => None,
        }
    }

    fn handle_reference(
        &self,
        kind: SearchKind,
        references: &ReferenceAndListParam,
    ) -> Option<SqlFragment> {
        if kind != SearchKind::Patient {
            return None;
        }
        let target = ReferenceTarget {
            column: "enrollment.patient_id",
            resource_type: "Patient",
            linked_table: "person",
            chain: &PersonSearch::chain_condition,
        };
        and_of_ors(references, |reference| ReferenceHandler::build_sql(reference, &target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::CriteriaBuilder;
    use crate::search::fragment::SqlParam;
    use crate::types::{ReferenceParam, SearchParameterMap, TokenParam};

    #[test]
    fn test_type_tokens_and_of_ors() {
        let tokens = TokenAndListParam::new()
            .and(vec![TokenParam::parse("A"), TokenParam::parse("B")])
            .and(vec![TokenParam::parse("C")]);
        let frag = EnrollmentSearch.handle_token(SearchKind::Type, &tokens).unwrap();

        assert!(frag.sql.starts_with("((EXISTS"));
        assert_eq!(
            frag.params,
            vec![SqlParam::string("A"), SqlParam::string("B"), SqlParam::string("C")]
        );
    }

    #[test]
    fn test_date_property_selects_column() {
        let range = DateRangeParam::from_prefixed("date", &["ge2020"]).unwrap();
        let enrolled = EnrollmentSearch.handle_date(SearchKind::Date, None, &range).unwrap();
        assert_eq!(enrolled.sql, "enrollment.date_enrolled >= ?");

        let completed = EnrollmentSearch
            .handle_date(SearchKind::Date, Some("date_completed"), &range)
            .unwrap();
        assert_eq!(completed.sql, "enrollment.date_completed >= ?");

        assert!(EnrollmentSearch
            .handle_date(SearchKind::Date, Some("birthdate"), &range)
            .is_none());
    }

    #[test]
    fn test_patient_chain() {
        let references = ReferenceAndListParam::single(ReferenceParam::chained("name", "Doe"));
        let frag = EnrollmentSearch
            .handle_reference(SearchKind::Patient, &references)
            .unwrap();
        assert!(frag.sql.starts_with("enrollment.patient_id IN (SELECT person.id FROM person"));
        assert_eq!(frag.params.len(), 2);
    }

    #[test]
    fn test_resolved_query_places_voided_first() {
        let map = SearchParameterMap::new().with_references(
            SearchKind::Patient,
            ReferenceAndListParam::single(ReferenceParam::parse("Patient/p1")),
        );
        let query = CriteriaBuilder::new(EnrollmentSearch).resolve(map).unwrap();

        assert_eq!(
            query.filter.sql,
            "(enrollment.voided = ?) AND (enrollment.patient_id = ?)"
        );
        assert_eq!(
            query.filter.params,
            vec![SqlParam::integer(0), SqlParam::string("p1")]
        );
    }
}
