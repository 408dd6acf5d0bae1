//! Casegen server library.
//!
//! Turns requirement text, documents, designs and screenshots into test cases
//! through a text generator, and persists them per project together with
//! QA analyses.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
