//! Search interaction handlers.
//!
//! `GET [base]/EpisodeOfCare?...` and `GET [base]/Patient?...`, answered
//! with a searchset Bundle.

use axum::{extract::State, http::StatusCode, response::Response};
use carebridge_fhir::{EpisodeOfCare, Patient};
use carebridge_persistence::SearchParameterMap;
use tracing::debug;
use url::form_urlencoded;

use crate::error::RestResult;
use crate::extractors::SearchParams;
use crate::provider::{ResourceProviders, SearchResults};
use crate::responses::{BundleBuilder, BundleEntry, BundleLink, SearchMode, fhir_json};
use crate::state::AppState;

type SearchFn = fn(&ResourceProviders, SearchParameterMap) -> RestResult<SearchResults>;

/// Searches EpisodeOfCare resources.
pub async fn search_episodes_handler(
    State(state): State<AppState>,
    params: SearchParams,
) -> RestResult<Response> {
    search(state, EpisodeOfCare::RESOURCE_TYPE, params, |providers, map| {
        providers.episodes.search(map)
    })
    .await
}

/// Searches Patient resources.
pub async fn search_patients_handler(
    State(state): State<AppState>,
    params: SearchParams,
) -> RestResult<Response> {
    search(state, Patient::RESOURCE_TYPE, params, |providers, map| {
        providers.patients.search(map)
    })
    .await
}

async fn search(
    state: AppState,
    resource_type: &'static str,
    params: SearchParams,
    run: SearchFn,
) -> RestResult<Response> {
    debug!(
        resource_type,
        param_count = params.pairs().len(),
        "Processing search request"
    );

    let map = params.to_parameter_map()?;
    let offset = params.offset();
    let count = state.config().page_size(params.count());

    let (total, entries) = state
        .run_blocking(move |providers| {
            let results = run(providers, map)?;
            let entries = results.page(offset, offset.saturating_add(count))?;
            Ok((results.total(), entries))
        })
        .await?;

    let base_url = &state.config().base_url;
    let mut bundle = BundleBuilder::searchset().total(total).add_link(BundleLink::new(
        "self",
        build_search_url(base_url, resource_type, params.pairs()),
    ));

    let filters: Vec<(String, String)> = params
        .search_pairs()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect();
    if count > 0 && offset.saturating_add(count) < total {
        let next = page_pairs(&filters, count, offset + count);
        bundle = bundle.add_link(BundleLink::new(
            "next",
            build_search_url(base_url, resource_type, &next),
        ));
    }
    if offset > 0 {
        let previous = page_pairs(&filters, count, offset.saturating_sub(count));
        bundle = bundle.add_link(BundleLink::new(
            "previous",
            build_search_url(base_url, resource_type, &previous),
        ));
    }

    for resource in entries.matches {
        bundle = bundle.add_entry(BundleEntry::for_resource(base_url, resource, SearchMode::Match));
    }
    for resource in entries.included {
        bundle = bundle.add_entry(BundleEntry::for_resource(
            base_url,
            resource,
            SearchMode::Include,
        ));
    }

    Ok(fhir_json(StatusCode::OK, &bundle.build()))
}

/// Filter pairs plus explicit paging.
fn page_pairs(filters: &[(String, String)], count: usize, offset: usize) -> Vec<(String, String)> {
    let mut pairs = filters.to_vec();
    pairs.push(("_count".to_string(), count.to_string()));
    pairs.push(("_offset".to_string(), offset.to_string()));
    pairs
}

/// Builds a search URL from base URL and parameters.
fn build_search_url(base_url: &str, resource_type: &str, params: &[(String, String)]) -> String {
    let base = format!("{}/{}", base_url.trim_end_matches('/'), resource_type);
    if params.is_empty() {
        return base;
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{}?{}", base, query)
}
