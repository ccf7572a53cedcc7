//! Story point estimation service.
//!
//! The CPU-bound pipeline lives in `story_points_core`; this crate adds the
//! process-level pieces: configuration, the SQLite artifact store, the shared
//! application context, dataset files, the HTTP API and the CLI.

pub mod api;
pub mod config;
pub mod context;
pub mod db;
pub mod loader;
