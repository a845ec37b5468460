//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::{RestError, RestResult};
use crate::provider::{RecordStore, ResourceProviders};

/// Shared application state.
///
/// Cheap to clone; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
    providers: Arc<ResourceProviders>,
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Wires providers to `store`.
    pub fn new<S: RecordStore + 'static>(store: Arc<S>, config: ServerConfig) -> Self {
        let providers = Arc::new(ResourceProviders::new(store.clone()));
        Self {
            store,
            providers,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn providers(&self) -> &ResourceProviders {
        &self.providers
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs provider work on the blocking thread pool.
    pub async fn run_blocking<T, F>(&self, work: F) -> RestResult<T>
    where
        F: FnOnce(&ResourceProviders) -> RestResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let providers = Arc::clone(&self.providers);
        tokio::task::spawn_blocking(move || work(&providers))
            .await
            .map_err(|e| RestError::internal(format!("Storage task failed: {}", e)))?
    }
}
