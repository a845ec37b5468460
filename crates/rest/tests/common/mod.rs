//! Common test utilities for REST API testing.
//!
//! - [`harness`] - a test server over an in-memory SQLite store
//! - [`fixtures`] - seeded records and request bodies

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::{RestTestHarness, entry_keys, link};
