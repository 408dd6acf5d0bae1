//! End-to-end API tests for the generation and persistence pipeline.
//!
//! Runs against in-memory SQLite with a scripted text generator; no network
//! or external database is needed.
//!
//! Run with: cargo test --test pipeline_api

mod test_helpers;

mod test_analyses;
mod test_auth;
mod test_generations;
mod test_projects;
mod test_test_cases;
