//! A small task-tracking board: a file-backed JSON document store, a
//! sync server exposing it as fetch/replace-all on one resource (with
//! SSE push), a client cache applying optimistic whole-collection
//! edits, and a pure filter/sort query engine for derived views.
//!
//! Concurrency policy is deliberately last-writer-wins at
//! whole-collection granularity: concurrent writers can silently lose
//! each other's changes. This is a documented limitation of the
//! low-concurrency, single-team design, not an oversight.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod server;
pub mod store;

pub use error::{Error, Result};
