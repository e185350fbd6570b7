// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod cursor;
pub mod error;
pub mod metrics;
pub mod models;
pub mod projector;
pub mod query;
pub mod runtime;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::NewsError;
