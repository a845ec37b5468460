//! # carebridge-rest
//!
//! The `EpisodeOfCare` resource provider and the HTTP surface over it.
//!
//! - [`provider`] - CRUD and search semantics, independent of HTTP
//! - [`extractors`] - request bodies and search query strings
//! - [`handlers`] / [`routing`] - the axum routes
//! - [`responses`] - OperationOutcome and searchset Bundle building
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use carebridge_persistence::backends::sqlite::SqliteBackend;
//! use carebridge_rest::{ServerConfig, create_app_with_config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = SqliteBackend::open("carebridge.db")?;
//!     backend.init_schema()?;
//!
//!     let config = ServerConfig::default();
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     let app = create_app_with_config(Arc::new(backend), config);
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod provider;
pub mod responses;
pub mod routing;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use provider::{EpisodeOfCareProvider, PatientProvider, RecordStore, ResourceProviders};
pub use state::AppState;

/// Creates the application with the default configuration.
pub fn create_app<S: RecordStore + 'static>(store: Arc<S>) -> Router {
    create_app_with_config(store, ServerConfig::default())
}

/// Creates the application: routes, tracing, request timeout and, when
/// enabled, CORS.
pub fn create_app_with_config<S: RecordStore + 'static>(
    store: Arc<S>,
    config: ServerConfig,
) -> Router {
    info!(backend = store.backend_name(), "Creating REST application");

    let state = AppState::new(store, config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. Call once at startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "carebridge_rest={level},carebridge_persistence={level},\
             carebridge_translators={level},carebridge={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
