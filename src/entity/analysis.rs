//! Analysis entity: one persisted single-object generation.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "analyses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    /// defect_triage, automation_candidate or change_impact
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub source: String,
    /// Normalized payload; NULL in fallback mode
    #[sea_orm(column_type = "Json", nullable)]
    pub payload: Option<JsonValue>,
    /// Raw generator text; only set in fallback mode
    #[sea_orm(column_type = "Text", nullable)]
    pub raw_text: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub warning: Option<String>,
    pub created_at: DateTimeUtc,
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
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
