//! Assignment entity model
//!
//! This module contains the SeaORM entity model for the assignments table,
//! which binds a reader to a chapter inside an organization. The status
//! column is free text in the database; conversion to the domain type rejects
//! anything outside the status ring.

use chrono::Utc;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::reader::Entity as Reader;
use crate::tracker::{Assignment, AssignmentStatus, OrganizationId, UnknownStatus};

/// Assignment entity, unique per (organization_id, chapter_id)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    /// Unique identifier for the assignment (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub reader_id: Uuid,

    pub chapter_id: i32,

    /// One of pending|in_progress|completed
    pub status: String,

    pub assigned_at: DateTimeWithTimeZone,

    /// Non-null exactly when status is completed
    pub completed_at: Option<DateTimeWithTimeZone>,

    pub notes: Option<String>,

    /// Owning organization
    pub organization_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Reader",
        from = "Column::ReaderId",
        to = "super::reader::Column::Id",
        on_delete = "Cascade"
    )]
    Reader,
    #[sea_orm(
        belongs_to = "super::chapter::Entity",
        from = "Column::ChapterId",
        to = "super::chapter::Column::Id"
    )]
    Chapter,
}

impl Related<Reader> for Entity {
    fn to() -> RelationDef {
        Relation::Reader.def()
    }
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Assignment {
    type Error = UnknownStatus;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: AssignmentStatus = model.status.parse()?;
        Ok(Self {
            id: model.id,
            reader_id: model.reader_id,
            chapter_id: model.chapter_id,
            status,
            assigned_at: model.assigned_at.with_timezone(&Utc),
            completed_at: model.completed_at.map(|at| at.with_timezone(&Utc)),
            notes: model.notes,
            organization_id: OrganizationId(model.organization_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> Model {
        Model {
            id: Uuid::new_v4(),
            reader_id: Uuid::new_v4(),
            chapter_id: 7,
            status: status.to_string(),
            assigned_at: Utc::now().into(),
            completed_at: None,
            notes: Some("start after Ramadan".to_string()),
            organization_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn converts_known_status() {
        let model = row("in_progress");
        let assignment = Assignment::try_from(model.clone()).unwrap();

        assert_eq!(assignment.status, AssignmentStatus::InProgress);
        assert_eq!(assignment.chapter_id, 7);
        assert_eq!(assignment.organization_id.0, model.organization_id);
        assert_eq!(assignment.notes.as_deref(), Some("start after Ramadan"));
    }

    #[test]
    fn rejects_unknown_status_at_boundary() {
        let err = Assignment::try_from(row("archived")).unwrap_err();
        assert_eq!(err, UnknownStatus("archived".to_string()));
    }
}
