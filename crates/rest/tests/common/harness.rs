//! REST API test harness.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::{TestResponse, TestServer};
use serde_json::Value;

use carebridge_persistence::backends::sqlite::SqliteBackend;
use carebridge_rest::{ServerConfig, create_app_with_config};

/// A test server over a fresh in-memory store.
///
/// ```rust,ignore
/// let harness = RestTestHarness::with_enrollments();
/// let response = harness.get("/EpisodeOfCare/e1").await;
/// response.assert_status_ok();
/// ```
pub struct RestTestHarness {
    pub server: TestServer,
    pub backend: Arc<SqliteBackend>,
    pub config: ServerConfig,
}

impl RestTestHarness {
    /// An empty store.
    pub fn new() -> Self {
        Self::seeded(|_| {})
    }

    /// Patients and programs, no enrollments.
    pub fn with_reference_data() -> Self {
        Self::seeded(super::seed_reference_data)
    }

    /// The enrollments in [`super::seed_enrollments`].
    pub fn with_enrollments() -> Self {
        Self::seeded(super::seed_enrollments)
    }

    pub fn seeded(seed: impl FnOnce(&SqliteBackend)) -> Self {
        Self::with_config(ServerConfig::for_testing(), seed)
    }

    pub fn with_config(config: ServerConfig, seed: impl FnOnce(&SqliteBackend)) -> Self {
        let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
        backend.init_schema().expect("Failed to initialize schema");
        seed(&backend);
        let backend = Arc::new(backend);

        let app = create_app_with_config(Arc::clone(&backend), config.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            backend,
            config,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.server.get(path).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        self.server.post(path).json(body).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        self.server.put(path).json(body).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.server.delete(path).await
    }

    /// Runs a search and returns the Bundle.
    pub async fn search(&self, path: &str) -> Value {
        let response = self.get(path).await;
        response.assert_status_ok();
        response.json::<Value>()
    }
}

/// `resourceType/id` of every entry in a Bundle, in order.
pub fn entry_keys(bundle: &Value) -> Vec<String> {
    bundle["entry"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .map(|e| {
                    format!(
                        "{}/{}",
                        e["resource"]["resourceType"].as_str().unwrap_or_default(),
                        e["resource"]["id"].as_str().unwrap_or_default()
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The URL of the Bundle link with relation `rel`.
pub fn link(bundle: &Value, rel: &str) -> Option<String> {
    bundle["link"].as_array().and_then(|links| {
        links
            .iter()
            .find(|l| l["relation"] == rel)
            .and_then(|l| l["url"].as_str())
            .map(str::to_string)
    })
}
