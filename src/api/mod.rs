//! API endpoint modules.

pub mod analyses;
pub mod generations;
pub mod health;
pub mod openapi;
pub mod projects;
pub mod test_cases;

pub use analyses::configure_routes as configure_analysis_routes;
pub use generations::configure_routes as configure_generation_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use projects::configure_routes as configure_project_routes;
pub use test_cases::configure_routes as configure_test_case_routes;
