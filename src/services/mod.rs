//! Business logic services.

pub mod api_key;
pub mod auth_admin;
pub mod generator;
pub mod pipeline;
pub mod prompts;
pub mod tenancy;

pub use auth_admin::configure_routes as configure_auth_routes;
pub use pipeline::PipelineSettings;
