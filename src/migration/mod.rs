//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_api_keys;
mod m20261001_000002_create_projects;
mod m20261001_000003_create_generation_batches;
mod m20261001_000004_create_test_cases;
mod m20261001_000005_create_analyses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_api_keys::Migration),
            Box::new(m20261001_000002_create_projects::Migration),
            Box::new(m20261001_000003_create_generation_batches::Migration),
            Box::new(m20261001_000004_create_test_cases::Migration),
            Box::new(m20261001_000005_create_analyses::Migration),
        ]
    }
}
