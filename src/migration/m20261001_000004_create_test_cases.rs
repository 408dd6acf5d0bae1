//! Migration: Create test_cases table.
//!
//! Stores normalized test cases, either generated (batch_id set) or entered manually.

use sea_orm_migration::prelude::*;

use super::m20261001_000002_create_projects::Projects;
use super::m20261001_000003_create_generation_batches::GenerationBatches;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum TestCases {
    Table,
    Id,
    ProjectId,
    BatchId,
    SourceKey,
    CaseRef,
    Scenario,
    Summary,
    Precondition,
    Steps,
    ExampleData,
    ExpectedResult,
    Priority,
    Severity,
    Classification,
    Sequence,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCases::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TestCases::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TestCases::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(TestCases::BatchId).uuid())
                    .col(ColumnDef::new(TestCases::SourceKey).text())
                    .col(ColumnDef::new(TestCases::CaseRef).text())
                    .col(ColumnDef::new(TestCases::Scenario).text())
                    .col(ColumnDef::new(TestCases::Summary).text())
                    .col(ColumnDef::new(TestCases::Precondition).text())
                    .col(ColumnDef::new(TestCases::Steps).json())
                    .col(ColumnDef::new(TestCases::ExampleData).json())
                    .col(ColumnDef::new(TestCases::ExpectedResult).text())
                    .col(ColumnDef::new(TestCases::Priority).text())
                    .col(ColumnDef::new(TestCases::Severity).text())
                    .col(ColumnDef::new(TestCases::Classification).string_len(20))
                    .col(
                        ColumnDef::new(TestCases::Sequence)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TestCases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_test_cases_project_id")
                            .from(TestCases::Table, TestCases::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_test_cases_batch_id")
                            .from(TestCases::Table, TestCases::BatchId)
                            .to(GenerationBatches::Table, GenerationBatches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_project_id")
                    .table(TestCases::Table)
                    .col(TestCases::ProjectId)
                    .to_owned(),
            )
            .await?;

        // Batch children in order
        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_batch_sequence")
                    .table(TestCases::Table)
                    .col(TestCases::BatchId)
                    .col(TestCases::Sequence)
                    .to_owned(),
            )
            .await?;

        // Severity aggregation
        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_project_severity")
                    .table(TestCases::Table)
                    .col(TestCases::ProjectId)
                    .col(TestCases::Severity)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCases::Table).if_exists().to_owned())
            .await
    }
}
