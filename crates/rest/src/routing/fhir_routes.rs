//! FHIR route configuration.

use axum::{Router, routing::get};

use crate::handlers;
use crate::state::AppState;

/// Creates all REST routes.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `GET /EpisodeOfCare` - Search
/// - `POST /EpisodeOfCare` - Create
/// - `PUT /EpisodeOfCare` - Update without id (always 400)
/// - `GET /EpisodeOfCare/{id}` - Read
/// - `PUT /EpisodeOfCare/{id}` - Update
/// - `DELETE /EpisodeOfCare/{id}` - Delete
/// - `GET /Patient` - Search
/// - `GET /Patient/{id}` - Read
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/EpisodeOfCare",
            get(handlers::search_episodes_handler)
                .post(handlers::create_episode_handler)
                .put(handlers::update_episode_without_id_handler),
        )
        .route(
            "/EpisodeOfCare/{id}",
            get(handlers::read_episode_handler)
                .put(handlers::update_episode_handler)
                .delete(handlers::delete_episode_handler),
        )
        .route("/Patient", get(handlers::search_patients_handler))
        .route("/Patient/{id}", get(handlers::read_patient_handler))
        .with_state(state)
}

