//! HTTP request handlers.
//!
//! Handlers are thin: they extract the request, run the provider call on
//! the blocking pool and format the result. All semantics live in
//! [`crate::provider`].

mod create;
mod delete;
mod health;
mod read;
mod search;
mod update;

pub use create::create_episode_handler;
pub use delete::delete_episode_handler;
pub use health::health_handler;
pub use read::{read_episode_handler, read_patient_handler};
pub use search::{search_episodes_handler, search_patients_handler};
pub use update::{update_episode_handler, update_episode_without_id_handler};
