//! TestCase entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub batch_id: Option<Uuid>,
    /// External origin key, e.g. an issue identifier
    #[sea_orm(column_type = "Text", nullable)]
    pub source_key: Option<String>,
    /// Generator-invented short identifier (not unique)
    #[sea_orm(column_type = "Text", nullable)]
    pub case_ref: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub scenario: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub precondition: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub steps: Option<JsonValue>,
    /// Tagged example data, see `models::ExampleData`
    #[sea_orm(column_type = "Json", nullable)]
    pub example_data: Option<JsonValue>,
    #[sea_orm(column_type = "Text", nullable)]
    pub expected_result: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub priority: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub severity: Option<String>,
    /// "positive" / "negative" when flattened from a grouped scenario
    pub classification: Option<String>,
    /// Position within the batch (or 0 for manual cases)
    pub sequence: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::generation_batch::Entity",
        from = "Column::BatchId",
        to = "super::generation_batch::Column::Id",
        on_delete = "Cascade"
    )]
    Batch,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::generation_batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
