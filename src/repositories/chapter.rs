//! Read-only access to the global chapter catalog.

use crate::error::RepositoryError;
use crate::models::ChapterEntity;
use crate::models::chapter::Column as ChapterColumn;
use crate::tracker::Chapter;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

pub struct ChapterRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ChapterRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// All chapters ordered by id. Not tenant scoped.
    pub async fn list(&self) -> Result<Vec<Chapter>, RepositoryError> {
        let rows = ChapterEntity::find()
            .order_by_asc(ChapterColumn::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows.into_iter().map(Chapter::from).collect())
    }
}
