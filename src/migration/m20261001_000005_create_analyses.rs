//! Migration: Create analyses table.

use sea_orm_migration::prelude::*;

use super::m20261001_000002_create_projects::Projects;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Analyses {
    Table,
    Id,
    ProjectId,
    Kind,
    Source,
    Payload,
    RawText,
    Warning,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Analyses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Analyses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Analyses::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Analyses::Kind).string_len(40).not_null())
                    .col(ColumnDef::new(Analyses::Source).text().not_null())
                    .col(ColumnDef::new(Analyses::Payload).json())
                    .col(ColumnDef::new(Analyses::RawText).text())
                    .col(ColumnDef::new(Analyses::Warning).text())
                    .col(
                        ColumnDef::new(Analyses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_analyses_project_id")
                            .from(Analyses::Table, Analyses::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_analyses_project_kind")
                    .table(Analyses::Table)
                    .col(Analyses::ProjectId)
                    .col(Analyses::Kind)
                    .col(Analyses::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Analyses::Table).if_exists().to_owned())
            .await
    }
}
