//! Reader entity model
//!
//! This module contains the SeaORM entity model for the readers table,
//! which stores organization-scoped people eligible for chapter assignments.

use chrono::Utc;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::tracker::{OrganizationId, Reader};

/// Reader entity scoped to one organization
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "readers")]
pub struct Model {
    /// Unique identifier for the reader (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    /// Contact email (optional)
    pub email: Option<String>,

    /// Hex colour used to mark the reader's chapters
    pub color: String,

    /// Owning organization
    pub organization_id: Uuid,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Reader {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            color: model.color,
            organization_id: OrganizationId(model.organization_id),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
