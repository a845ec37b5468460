//! Searchset Bundle building.

use serde_json::{Value, json};

/// Search mode for bundle entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Primary search result.
    Match,
    /// Included via _include or _revinclude.
    Include,
}

impl SearchMode {
    /// Returns the FHIR code string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Match => "match",
            SearchMode::Include => "include",
        }
    }
}

/// A link in a Bundle.
#[derive(Debug, Clone)]
pub struct BundleLink {
    /// The relation type (self, next, previous).
    pub relation: String,
    pub url: String,
}

impl BundleLink {
    pub fn new(relation: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            url: url.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "relation": self.relation,
            "url": self.url
        })
    }
}

/// An entry in a searchset Bundle.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    pub full_url: String,
    pub resource: Value,
    pub search_mode: SearchMode,
}

impl BundleEntry {
    /// Creates an entry whose full URL is derived from the resource's type
    /// and id.
    pub fn for_resource(base_url: &str, resource: Value, search_mode: SearchMode) -> Self {
        let full_url = format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            resource["resourceType"].as_str().unwrap_or_default(),
            resource["id"].as_str().unwrap_or_default()
        );
        Self {
            full_url,
            resource,
            search_mode,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "fullUrl": self.full_url,
            "resource": self.resource,
            "search": { "mode": self.search_mode.as_str() }
        })
    }
}

/// Builder for searchset Bundles.
#[derive(Debug, Default)]
pub struct BundleBuilder {
    total: Option<usize>,
    links: Vec<BundleLink>,
    entries: Vec<BundleEntry>,
}

impl BundleBuilder {
    pub fn searchset() -> Self {
        Self::default()
    }

    /// Sets the total match count.
    pub fn total(mut self, count: usize) -> Self {
        self.total = Some(count);
        self
    }

    pub fn add_link(mut self, link: BundleLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn add_entry(mut self, entry: BundleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Builds the Bundle resource.
    pub fn build(self) -> Value {
        let mut bundle = json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if let Some(total) = self.total {
            bundle["total"] = json!(total);
        }

        if !self.links.is_empty() {
            bundle["link"] = json!(self.links.iter().map(BundleLink::to_json).collect::<Vec<_>>());
        }

        bundle["entry"] = json!(
            self.entries
                .iter()
                .map(BundleEntry::to_json)
                .collect::<Vec<_>>()
        );

        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchset_bundle() {
        let patient = json!({
            "resourceType": "Patient",
            "id": "123"
        });

        let bundle = BundleBuilder::searchset()
            .total(1)
            .add_link(BundleLink::new("self", "http://example.com/Patient"))
            .add_entry(BundleEntry::for_resource(
                "http://example.com/",
                patient,
                SearchMode::Match,
            ))
            .build();

        assert_eq!(bundle["resourceType"], "Bundle");
        assert_eq!(bundle["type"], "searchset");
        assert_eq!(bundle["total"], 1);
        assert_eq!(bundle["link"][0]["relation"], "self");
        assert_eq!(bundle["entry"][0]["fullUrl"], "http://example.com/Patient/123");
        assert_eq!(bundle["entry"][0]["search"]["mode"], "match");
    }

    #[test]
    fn test_empty_bundle_has_entry_array() {
        let bundle = BundleBuilder::searchset().total(0).build();
        assert_eq!(bundle["entry"], json!([]));
    }

    #[test]
    fn test_included_entry_mode() {
        let entry = BundleEntry::for_resource(
            "http://x",
            json!({"resourceType": "Patient", "id": "p1"}),
            SearchMode::Include,
        );
        assert_eq!(entry.to_json()["search"]["mode"], "include");
    }
}
