//! # Assignment Repository
//!
//! Chapter assignments within one organization. The unique
//! `(organization_id, chapter_id)` index is the only guard against double
//! assignment; a violation surfaces as
//! [`RepositoryError::ChapterAlreadyAssigned`].

use crate::error::{RepositoryError, is_foreign_key_violation, is_unique_violation};
use crate::models::assignment::{ActiveModel as AssignmentActiveModel, Column as AssignmentColumn};
use crate::models::{AssignmentEntity, ReaderEntity};
use crate::models::reader::Column as ReaderColumn;
use crate::telemetry::events;
use crate::tracker::{Assignment, AssignmentStatus, OrganizationId, is_valid_chapter_id};
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// Input for assigning a chapter to a reader
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub chapter_id: i32,
    pub reader_id: Uuid,
    pub notes: Option<String>,
}

pub struct AssignmentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AssignmentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Assignments of the organization, ordered by chapter.
    pub async fn list(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        let rows = AssignmentEntity::find()
            .filter(AssignmentColumn::OrganizationId.eq(organization_id.0))
            .order_by_asc(AssignmentColumn::ChapterId)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        rows.into_iter()
            .map(|row| Assignment::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    pub async fn find(
        &self,
        organization_id: OrganizationId,
        assignment_id: Uuid,
    ) -> Result<Option<Assignment>, RepositoryError> {
        let row = AssignmentEntity::find_by_id(assignment_id)
            .filter(AssignmentColumn::OrganizationId.eq(organization_id.0))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        row.map(Assignment::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    /// Assign an unassigned chapter to a reader of the same organization.
    ///
    /// New assignments start `pending` with no completion stamp.
    pub async fn assign(
        &self,
        organization_id: OrganizationId,
        new_assignment: NewAssignment,
    ) -> Result<Assignment, RepositoryError> {
        let NewAssignment {
            chapter_id,
            reader_id,
            notes,
        } = new_assignment;

        if !is_valid_chapter_id(chapter_id) {
            return Err(RepositoryError::validation_error(format!(
                "Chapter id must be between 1 and 30, got {chapter_id}"
            )));
        }

        let reader_in_org = ReaderEntity::find_by_id(reader_id)
            .filter(ReaderColumn::OrganizationId.eq(organization_id.0))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            > 0;
        if !reader_in_org {
            return Err(RepositoryError::not_found("Reader not found"));
        }

        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let model = insert_assignment(self.db, organization_id, chapter_id, reader_id, notes).await?;

        events::assignment_created();
        tracing::info!(
            organization_id = %organization_id,
            assignment_id = %model.id,
            chapter_id,
            reader_id = %reader_id,
            "Chapter assigned"
        );
        Assignment::try_from(model).map_err(RepositoryError::from)
    }

    /// Move an assignment one step around the status ring.
    ///
    /// The update is conditional on the status read, so two concurrent
    /// advances cannot both apply from the same starting point.
    pub async fn advance(
        &self,
        organization_id: OrganizationId,
        assignment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Assignment, RepositoryError> {
        let current = self
            .find(organization_id, assignment_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Assignment not found"))?;

        let change = current.advance(now);
        let completed_at: Option<DateTimeWithTimeZone> = change.completed_at.map(Into::into);

        let result = AssignmentEntity::update_many()
            .col_expr(AssignmentColumn::Status, Expr::value(change.status.as_str()))
            .col_expr(AssignmentColumn::CompletedAt, Expr::value(completed_at))
            .filter(AssignmentColumn::Id.eq(assignment_id))
            .filter(AssignmentColumn::OrganizationId.eq(organization_id.0))
            .filter(AssignmentColumn::Status.eq(current.status.as_str()))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::Conflict(
                "Assignment was modified concurrently; refresh and retry".to_string(),
            ));
        }

        events::assignment_advanced(change.status);
        tracing::info!(
            organization_id = %organization_id,
            assignment_id = %assignment_id,
            from = current.status.as_str(),
            to = change.status.as_str(),
            "Assignment advanced"
        );

        Ok(Assignment {
            status: change.status,
            completed_at: change.completed_at,
            ..current
        })
    }

    /// Remove an assignment of the organization.
    pub async fn unassign(
        &self,
        organization_id: OrganizationId,
        assignment_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let result = AssignmentEntity::delete_many()
            .filter(AssignmentColumn::Id.eq(assignment_id))
            .filter(AssignmentColumn::OrganizationId.eq(organization_id.0))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Assignment not found"));
        }

        events::assignment_removed();
        tracing::info!(
            organization_id = %organization_id,
            assignment_id = %assignment_id,
            "Chapter unassigned"
        );
        Ok(())
    }
}

/// Insert a pending assignment, mapping constraint failures to domain errors.
///
/// The reader check in `assign` is not atomic with this insert, so a reader
/// deleted in between surfaces here as a foreign key failure.
async fn insert_assignment<C: ConnectionTrait>(
    db: &C,
    organization_id: OrganizationId,
    chapter_id: i32,
    reader_id: Uuid,
    notes: Option<String>,
) -> Result<crate::models::assignment::Model, RepositoryError> {
    let inserted = AssignmentActiveModel {
        id: Set(Uuid::new_v4()),
        reader_id: Set(reader_id),
        chapter_id: Set(chapter_id),
        status: Set(AssignmentStatus::Pending.as_str().to_string()),
        assigned_at: Set(Utc::now().into()),
        completed_at: Set(None),
        notes: Set(notes),
        organization_id: Set(organization_id.0),
    }
    .insert(db)
    .await;

    match inserted {
        Ok(model) => Ok(model),
        Err(err) if is_unique_violation(&err) => {
            events::assignment_conflict();
            tracing::info!(
                organization_id = %organization_id,
                chapter_id,
                "Chapter already assigned"
            );
            Err(RepositoryError::ChapterAlreadyAssigned { chapter_id })
        }
        Err(err) if is_foreign_key_violation(&err) => {
            tracing::info!(
                organization_id = %organization_id,
                reader_id = %reader_id,
                "Reader removed before assignment landed"
            );
            Err(RepositoryError::not_found("Reader not found"))
        }
        Err(err) => Err(RepositoryError::database_error(err)),
    }
}
