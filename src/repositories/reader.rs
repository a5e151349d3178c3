//! # Reader Repository
//!
//! Every query carries the caller's organization. Deleting a reader removes
//! its assignments through the foreign key cascade.

use crate::error::RepositoryError;
use crate::models::ReaderEntity;
use crate::models::reader::{ActiveModel as ReaderActiveModel, Column as ReaderColumn};
use crate::telemetry::events;
use crate::tracker::{OrganizationId, Reader, palette};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

const MAX_NAME_LEN: usize = 255;

/// Input for creating a reader
#[derive(Debug, Clone, Default)]
pub struct NewReader {
    pub name: String,
    pub email: Option<String>,
    /// Explicit palette colour (any case); the next free palette colour when absent
    pub color: Option<String>,
}

pub struct ReaderRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReaderRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Readers of the organization, ordered by name.
    pub async fn list(&self, organization_id: OrganizationId) -> Result<Vec<Reader>, RepositoryError> {
        let rows = ReaderEntity::find()
            .filter(ReaderColumn::OrganizationId.eq(organization_id.0))
            .order_by_asc(ReaderColumn::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows.into_iter().map(Reader::from).collect())
    }

    pub async fn find(
        &self,
        organization_id: OrganizationId,
        reader_id: Uuid,
    ) -> Result<Option<Reader>, RepositoryError> {
        let row = ReaderEntity::find_by_id(reader_id)
            .filter(ReaderColumn::OrganizationId.eq(organization_id.0))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(row.map(Reader::from))
    }

    pub async fn create(
        &self,
        organization_id: OrganizationId,
        new_reader: NewReader,
    ) -> Result<Reader, RepositoryError> {
        let name = validate_name(&new_reader.name)?;
        let email = new_reader
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());

        let color = match new_reader.color.map(|c| c.trim().to_string()) {
            Some(color) if !color.is_empty() => palette::palette_color(&color)
                .ok_or_else(|| {
                    RepositoryError::validation_error(format!(
                        "Color must be one of the reader palette colours: {}",
                        palette::READER_COLORS.join(", ")
                    ))
                })?
                .to_string(),
            _ => {
                let existing = self.list(organization_id).await?;
                palette::next_color(&existing).to_string()
            }
        };

        let model = ReaderActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            color: Set(color),
            organization_id: Set(organization_id.0),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;

        tracing::info!(
            organization_id = %organization_id,
            reader_id = %model.id,
            "Reader added"
        );
        Ok(model.into())
    }

    /// Delete one reader of the organization; its assignments go with it.
    pub async fn delete(
        &self,
        organization_id: OrganizationId,
        reader_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let result = ReaderEntity::delete_many()
            .filter(ReaderColumn::Id.eq(reader_id))
            .filter(ReaderColumn::OrganizationId.eq(organization_id.0))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Reader not found"));
        }

        events::readers_removed(result.rows_affected);
        tracing::info!(organization_id = %organization_id, reader_id = %reader_id, "Reader removed");
        Ok(())
    }

    /// Remove every reader of the organization and nothing else.
    pub async fn delete_all(&self, organization_id: OrganizationId) -> Result<u64, RepositoryError> {
        let result = ReaderEntity::delete_many()
            .filter(ReaderColumn::OrganizationId.eq(organization_id.0))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        events::readers_removed(result.rows_affected);
        tracing::info!(
            organization_id = %organization_id,
            removed = result.rows_affected,
            "All readers removed"
        );
        Ok(result.rows_affected)
    }
}

fn validate_name(name: &str) -> Result<String, RepositoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RepositoryError::validation_error("Reader name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RepositoryError::validation_error(
            "Reader name cannot exceed 255 characters",
        ));
    }
    Ok(name.to_string())
}
