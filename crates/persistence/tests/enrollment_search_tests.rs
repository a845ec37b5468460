//! Enrollment (`EpisodeOfCare`) search against the SQLite backend.

mod common;

use carebridge_persistence::repository::{EnrollmentRepository, SearchExecutor};
use carebridge_persistence::search::{CriteriaBuilder, EnrollmentSearch};
use carebridge_persistence::types::{
    DateRangeParam, IncludeParam, IncludeSet, ReferenceAndListParam, ReferenceParam, SearchKind,
    SearchParameterMap, SearchValue, TokenAndListParam, TokenParam,
};

use common::*;

fn search_ids(backend: &impl SearchExecutor, map: SearchParameterMap) -> Vec<String> {
    let query = CriteriaBuilder::new(EnrollmentSearch)
        .resolve(map)
        .expect("Failed to resolve search");
    backend.execute(&query).expect("Failed to run search").ids
}

fn type_map(tokens: TokenAndListParam) -> SearchParameterMap {
    SearchParameterMap::new().with_tokens(SearchKind::Type, tokens)
}

fn date_map(property: Option<&str>, values: &[&str]) -> SearchParameterMap {
    let range = DateRangeParam::from_prefixed("date", values).unwrap();
    SearchParameterMap::new().with_property(SearchKind::Date, property, SearchValue::Date(range))
}

// ============================================================================
// Baseline
// ============================================================================

#[test]
fn test_empty_map_returns_all_live_records_in_id_order() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let query = CriteriaBuilder::new(EnrollmentSearch)
        .resolve(SearchParameterMap::new())
        .unwrap();
    let page = backend.execute(&query).unwrap();

    assert_eq!(page.ids, vec!["e1", "e2", "e3"]);
    assert_eq!(page.total, 3);
}

#[test]
fn test_voided_records_never_match() {
    let backend = create_backend();
    seed_enrollments(&backend);
    backend.void_enrollment("e1").unwrap();

    let ids = search_ids(
        &backend,
        type_map(TokenAndListParam::single(TokenParam::new(Some(SNOMED), "86406008"))),
    );
    assert_eq!(ids, vec!["e3"]);
}

// ============================================================================
// Type (token)
// ============================================================================

#[test]
fn test_type_with_system_and_code() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let ids = search_ids(
        &backend,
        type_map(TokenAndListParam::single(TokenParam::new(Some(SNOMED), "56717001"))),
    );
    assert_eq!(ids, vec!["e2"]);
}

#[test]
fn test_type_code_only_matches_any_system() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let ids = search_ids(
        &backend,
        type_map(TokenAndListParam::single(TokenParam::parse("86406008"))),
    );
    assert_eq!(ids, vec!["e1", "e3"]);
}

#[test]
fn test_type_local_code_matches_concept_id() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let ids = search_ids(
        &backend,
        type_map(TokenAndListParam::single(TokenParam::parse("|concept-tb"))),
    );
    assert_eq!(ids, vec!["e2"]);

    let wrong_system = search_ids(
        &backend,
        type_map(TokenAndListParam::single(TokenParam::new(Some(SNOMED), "concept-tb"))),
    );
    assert!(wrong_system.is_empty());
}

#[test]
fn test_type_system_only() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let ids = search_ids(
        &backend,
        type_map(TokenAndListParam::single(TokenParam::parse(&format!("{SNOMED}|")))),
    );
    assert_eq!(ids, vec!["e1", "e2", "e3"]);
}

#[test]
fn test_type_or_list() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let tokens = TokenAndListParam::new().and(vec![
        TokenParam::parse("56717001"),
        TokenParam::parse("|concept-hiv"),
    ]);
    assert_eq!(search_ids(&backend, type_map(tokens)), vec!["e1", "e2", "e3"]);
}

#[test]
fn test_type_and_of_disjoint_codes_matches_nothing() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let tokens = TokenAndListParam::new()
        .and(vec![TokenParam::parse("56717001")])
        .and(vec![TokenParam::parse("86406008")]);
    assert!(search_ids(&backend, type_map(tokens)).is_empty());
}

#[test]
fn test_type_not_modifier() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let tokens = TokenAndListParam::single(TokenParam::parse("86406008").negated());
    assert_eq!(search_ids(&backend, type_map(tokens)), vec!["e2"]);
}

// ============================================================================
// Date
// ============================================================================

#[test]
fn test_date_lower_bound() {
    let backend = create_backend();
    seed_enrollments(&backend);

    assert_eq!(search_ids(&backend, date_map(None, &["ge2021"])), vec!["e2", "e3"]);
    assert_eq!(search_ids(&backend, date_map(None, &["gt2021"])), vec!["e3"]);
}

#[test]
fn test_date_upper_bound() {
    let backend = create_backend();
    seed_enrollments(&backend);

    assert_eq!(search_ids(&backend, date_map(None, &["lt2021-06-01"])), vec!["e1"]);
    assert_eq!(search_ids(&backend, date_map(None, &["le2021-06-01"])), vec!["e1", "e2"]);
}

#[test]
fn test_date_range_is_inclusive() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let ids = search_ids(&backend, date_map(None, &["ge2020-01-15", "le2022-03-10"]));
    assert_eq!(ids, vec!["e1", "e2", "e3"]);
}

#[test]
fn test_date_equality_uses_written_precision() {
    let backend = create_backend();
    seed_enrollments(&backend);

    assert_eq!(search_ids(&backend, date_map(None, &["2020-01"])), vec!["e1"]);
    assert!(search_ids(&backend, date_map(None, &["2020-02"])).is_empty());
}

#[test]
fn test_date_completed_property() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let ids = search_ids(&backend, date_map(Some("date_completed"), &["le2021-12-31"]));
    assert_eq!(ids, vec!["e2"]);
}

#[test]
fn test_last_updated() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let range = DateRangeParam::from_prefixed("_lastUpdated", &["ge2000"]).unwrap();
    let map = SearchParameterMap::new().with_date(SearchKind::LastUpdated, range);
    assert_eq!(search_ids(&backend, map), vec!["e1", "e2", "e3"]);

    let range = DateRangeParam::from_prefixed("_lastUpdated", &["lt2000"]).unwrap();
    let map = SearchParameterMap::new().with_date(SearchKind::LastUpdated, range);
    assert!(search_ids(&backend, map).is_empty());
}

// ============================================================================
// Patient (reference)
// ============================================================================

#[test]
fn test_patient_reference_forms() {
    let backend = create_backend();
    seed_enrollments(&backend);

    for raw in ["p1", "Patient/p1", "http://example.org/fhir/Patient/p1"] {
        let map = SearchParameterMap::new().with_references(
            SearchKind::Patient,
            ReferenceAndListParam::single(ReferenceParam::parse(raw)),
        );
        assert_eq!(search_ids(&backend, map), vec!["e1", "e2"], "reference {raw}");
    }
}

#[test]
fn test_patient_reference_of_other_type_matches_nothing() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let map = SearchParameterMap::new().with_references(
        SearchKind::Patient,
        ReferenceAndListParam::single(ReferenceParam::parse("Group/p1")),
    );
    assert!(search_ids(&backend, map).is_empty());
}

#[test]
fn test_patient_chain_by_name_and_identifier() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let by_name = SearchParameterMap::new().with_references(
        SearchKind::Patient,
        ReferenceAndListParam::single(ReferenceParam::chained("family", "smi")),
    );
    assert_eq!(search_ids(&backend, by_name), vec!["e3"]);

    let by_identifier = SearchParameterMap::new().with_references(
        SearchKind::Patient,
        ReferenceAndListParam::single(ReferenceParam::chained(
            "identifier",
            &format!("{MRN}|100"),
        )),
    );
    assert_eq!(search_ids(&backend, by_identifier), vec!["e1", "e2"]);
}

#[test]
fn test_combined_kinds_are_and_composed() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let map = type_map(TokenAndListParam::single(TokenParam::parse("86406008"))).with_references(
        SearchKind::Patient,
        ReferenceAndListParam::single(ReferenceParam::parse("Patient/p2")),
    );
    assert_eq!(search_ids(&backend, map), vec!["e3"]);
}

// ============================================================================
// _include
// ============================================================================

#[test]
fn test_include_patient() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let map = type_map(TokenAndListParam::single(TokenParam::parse("86406008"))).with_includes(
        SearchKind::Include,
        IncludeSet::new(vec![IncludeParam::new("EpisodeOfCare", "patient")]),
    );
    let query = CriteriaBuilder::new(EnrollmentSearch).resolve(map).unwrap();
    let page = backend.execute(&query).unwrap();
    assert_eq!(page.ids, vec!["e1", "e3"]);

    let included = backend.resolve_includes(&query, &page.ids).unwrap();
    let ids: Vec<_> = included
        .iter()
        .map(|r| (r.resource_type.as_str(), r.id.as_str()))
        .collect();
    assert_eq!(ids, vec![("Patient", "p1"), ("Patient", "p2")]);
}

#[test]
fn test_include_on_empty_page_is_empty() {
    let backend = create_backend();
    seed_enrollments(&backend);

    let map = SearchParameterMap::new().with_includes(
        SearchKind::Include,
        IncludeSet::new(vec![IncludeParam::new("EpisodeOfCare", "patient")]),
    );
    let query = CriteriaBuilder::new(EnrollmentSearch).resolve(map).unwrap();
    assert!(backend.resolve_includes(&query, &[]).unwrap().is_empty());
}
