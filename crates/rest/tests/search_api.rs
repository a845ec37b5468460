//! Integration tests for EpisodeOfCare and Patient search over HTTP:
//! parameter parsing, includes, paging links and error responses.

mod common;

use axum::http::StatusCode;
use serde_json::Value;

use carebridge_rest::ServerConfig;
use common::{RestTestHarness, entry_keys, link, seed_enrollments};

#[tokio::test]
async fn test_search_all_episodes() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness.search("/EpisodeOfCare").await;
    assert_eq!(bundle["resourceType"], "Bundle");
    assert_eq!(bundle["type"], "searchset");
    assert_eq!(bundle["total"], 3);
    assert_eq!(
        entry_keys(&bundle),
        vec!["EpisodeOfCare/e1", "EpisodeOfCare/e2", "EpisodeOfCare/e3"]
    );

    let first = &bundle["entry"][0];
    assert_eq!(first["search"]["mode"], "match");
    assert_eq!(
        first["fullUrl"],
        format!("{}/EpisodeOfCare/e1", harness.config.base_url)
    );
}

#[tokio::test]
async fn test_search_empty_store_has_empty_entry_list() {
    let harness = RestTestHarness::new();

    let bundle = harness.search("/EpisodeOfCare").await;
    assert_eq!(bundle["total"], 0);
    assert_eq!(bundle["entry"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_search_by_type() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness
        .search("/EpisodeOfCare?type=http://snomed.info/sct|86406008")
        .await;
    assert_eq!(
        entry_keys(&bundle),
        vec!["EpisodeOfCare/e1", "EpisodeOfCare/e3"]
    );

    let bundle = harness
        .search("/EpisodeOfCare?type=86406008,56717001")
        .await;
    assert_eq!(bundle["total"], 3);

    let bundle = harness
        .search("/EpisodeOfCare?type:not=http://snomed.info/sct|86406008")
        .await;
    assert_eq!(entry_keys(&bundle), vec!["EpisodeOfCare/e2"]);
}

#[tokio::test]
async fn test_repeated_parameters_are_and_composed() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness
        .search("/EpisodeOfCare?type=86406008&type=56717001")
        .await;
    assert_eq!(bundle["total"], 0);
}

#[tokio::test]
async fn test_search_by_patient() {
    let harness = RestTestHarness::with_enrollments();

    for query in ["patient=p1", "patient=Patient/p1", "patient:Patient=p1"] {
        let bundle = harness.search(&format!("/EpisodeOfCare?{query}")).await;
        assert_eq!(
            entry_keys(&bundle),
            vec!["EpisodeOfCare/e1", "EpisodeOfCare/e2"],
            "query {query}"
        );
    }
}

#[tokio::test]
async fn test_search_by_patient_chain() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness.search("/EpisodeOfCare?patient.name=Smith").await;
    assert_eq!(entry_keys(&bundle), vec!["EpisodeOfCare/e3"]);

    let bundle = harness
        .search("/EpisodeOfCare?patient.identifier=urn:carebridge:mrn|mrn-p1")
        .await;
    assert_eq!(bundle["total"], 2);
}

#[tokio::test]
async fn test_search_by_date() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness.search("/EpisodeOfCare?date=ge2021").await;
    assert_eq!(
        entry_keys(&bundle),
        vec!["EpisodeOfCare/e2", "EpisodeOfCare/e3"]
    );

    let bundle = harness
        .search("/EpisodeOfCare?date=ge2020-01-15&date=lt2021-06-01")
        .await;
    assert_eq!(entry_keys(&bundle), vec!["EpisodeOfCare/e1"]);
}

#[tokio::test]
async fn test_search_excludes_deleted() {
    let harness = RestTestHarness::with_enrollments();

    harness.delete("/EpisodeOfCare/e1").await.assert_status_ok();

    let bundle = harness.search("/EpisodeOfCare?patient=p1").await;
    assert_eq!(entry_keys(&bundle), vec!["EpisodeOfCare/e2"]);
}

#[tokio::test]
async fn test_unknown_parameters_are_ignored() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness.search("/EpisodeOfCare?unknown=1&_format=json").await;
    assert_eq!(bundle["total"], 3);
}

#[tokio::test]
async fn test_invalid_search_requests() {
    let harness = RestTestHarness::with_enrollments();

    for query in [
        "date=notadate",
        "date:missing=true",
        "_count=abc",
        "_offset=-1",
        "_include=EpisodeOfCare",
        "_include=EpisodeOfCare:condition",
        "name:fuzzy=Doe",
    ] {
        let path = if query.starts_with("name") {
            format!("/Patient?{query}")
        } else {
            format!("/EpisodeOfCare?{query}")
        };
        let response = harness.get(&path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let outcome: Value = response.json();
        assert_eq!(outcome["resourceType"], "OperationOutcome", "query {query}");
    }
}

#[tokio::test]
async fn test_include_patient() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness
        .search("/EpisodeOfCare?type=86406008&_include=EpisodeOfCare:patient")
        .await;
    assert_eq!(bundle["total"], 2);
    assert_eq!(
        entry_keys(&bundle),
        vec![
            "EpisodeOfCare/e1",
            "EpisodeOfCare/e3",
            "Patient/p1",
            "Patient/p2"
        ]
    );
    assert_eq!(bundle["entry"][2]["search"]["mode"], "include");
}

#[tokio::test]
async fn test_revinclude_episodes_on_patient_search() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness
        .search("/Patient?family=Doe&_revinclude=EpisodeOfCare:patient")
        .await;
    assert_eq!(bundle["total"], 1);
    assert_eq!(
        entry_keys(&bundle),
        vec!["Patient/p1", "EpisodeOfCare/e1", "EpisodeOfCare/e2"]
    );
}

#[tokio::test]
async fn test_patient_search_by_name() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness.search("/Patient?name=jo").await;
    assert_eq!(entry_keys(&bundle), vec!["Patient/p2"]);

    let bundle = harness.search("/Patient?family:exact=doe").await;
    assert_eq!(bundle["total"], 0);

    let bundle = harness.search("/Patient?family:exact=Doe").await;
    assert_eq!(entry_keys(&bundle), vec!["Patient/p1"]);
}

#[tokio::test]
async fn test_paging_links() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness.search("/EpisodeOfCare?_count=2").await;
    assert_eq!(bundle["total"], 3);
    assert_eq!(
        entry_keys(&bundle),
        vec!["EpisodeOfCare/e1", "EpisodeOfCare/e2"]
    );
    assert!(link(&bundle, "self").is_some());
    assert!(link(&bundle, "previous").is_none());

    let next = link(&bundle, "next").expect("next link");
    assert!(next.contains("_count=2"));
    assert!(next.contains("_offset=2"));

    let bundle = harness.search("/EpisodeOfCare?_count=2&_offset=2").await;
    assert_eq!(entry_keys(&bundle), vec!["EpisodeOfCare/e3"]);
    assert!(link(&bundle, "next").is_none());

    let previous = link(&bundle, "previous").expect("previous link");
    assert!(previous.contains("_offset=0"));
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let harness = RestTestHarness::with_enrollments();

    let bundle = harness.search("/EpisodeOfCare?_offset=10").await;
    assert_eq!(bundle["total"], 3);
    assert!(entry_keys(&bundle).is_empty());
}

#[tokio::test]
async fn test_page_size_is_clamped() {
    let config = ServerConfig {
        default_page_size: 1,
        max_page_size: 2,
        ..ServerConfig::for_testing()
    };
    let harness = RestTestHarness::with_config(config, seed_enrollments);

    let bundle = harness.search("/EpisodeOfCare").await;
    assert_eq!(entry_keys(&bundle).len(), 1);

    let bundle = harness.search("/EpisodeOfCare?_count=50").await;
    assert_eq!(entry_keys(&bundle).len(), 2);
}
