//! Migration: Create generation_batches table.

use sea_orm_migration::prelude::*;

use super::m20261001_000002_create_projects::Projects;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub(crate) enum GenerationBatches {
    Table,
    Id,
    ProjectId,
    Source,
    TestCaseCount,
    TestCaseIds,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GenerationBatches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GenerationBatches::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GenerationBatches::ProjectId).uuid().not_null())
                    .col(
                        ColumnDef::new(GenerationBatches::Source)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GenerationBatches::TestCaseCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GenerationBatches::TestCaseIds).json().not_null())
                    .col(
                        ColumnDef::new(GenerationBatches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generation_batches_project_id")
                            .from(GenerationBatches::Table, GenerationBatches::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Recent-N listing per project
        manager
            .create_index(
                Index::create()
                    .name("idx_generation_batches_project_created")
                    .table(GenerationBatches::Table)
                    .col(GenerationBatches::ProjectId)
                    .col(GenerationBatches::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(GenerationBatches::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}
