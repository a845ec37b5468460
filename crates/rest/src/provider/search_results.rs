//! Lazily rendered search results.

use std::sync::Arc;

use carebridge_persistence::search::ResolvedQuery;
use carebridge_persistence::types::SearchPage;
use serde_json::Value;
use tracing::trace;

use crate::error::RestResult;

use super::ResourceLoader;

/// The resources of one page: the matches in result order, then the records
/// reached through the query's includes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEntries {
    pub matches: Vec<Value>,
    pub included: Vec<Value>,
}

/// The ids matched by a search, rendered to resources a page at a time.
pub struct SearchResults {
    query: ResolvedQuery,
    page: SearchPage,
    loader: Arc<ResourceLoader>,
}

impl SearchResults {
    pub fn new(query: ResolvedQuery, page: SearchPage, loader: Arc<ResourceLoader>) -> Self {
        Self {
            query,
            page,
            loader,
        }
    }

    pub fn resource_type(&self) -> &'static str {
        self.query.resource_type
    }

    /// Number of matching records.
    pub fn total(&self) -> usize {
        self.page.total
    }

    pub fn ids(&self) -> &[String] {
        &self.page.ids
    }

    /// Renders the matches at positions `from..to`, clamped to the result
    /// set, together with their included records.
    ///
    /// A record voided between the search and the page fetch is skipped.
    pub fn page(&self, from: usize, to: usize) -> RestResult<PageEntries> {
        let len = self.page.ids.len();
        let from = from.min(len);
        let to = to.clamp(from, len);
        let page_ids = &self.page.ids[from..to];

        let mut entries = PageEntries::default();
        for id in page_ids {
            if let Some(resource) = self.loader.load(self.query.resource_type, id)? {
                entries.matches.push(resource);
            }
        }

        for included in self.loader.store().resolve_includes(&self.query, page_ids)? {
            if let Some(resource) = self.loader.load(&included.resource_type, &included.id)? {
                entries.included.push(resource);
            }
        }

        trace!(
            from,
            to,
            matches = entries.matches.len(),
            included = entries.included.len(),
            "Rendered search page"
        );
        Ok(entries)
    }
}
