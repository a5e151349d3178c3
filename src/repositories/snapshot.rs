//! Loads a [`TrackerSnapshot`] for one caller.

use crate::error::RepositoryError;
use crate::repositories::{AssignmentRepository, ChapterRepository, ReaderRepository};
use crate::tracker::{TenantScope, TrackerSnapshot};
use sea_orm::DatabaseConnection;

/// Fetch chapters, readers and assignments concurrently and wait for all three.
///
/// A caller without an organization gets the catalog and nothing else.
pub async fn load_snapshot(
    db: &DatabaseConnection,
    scope: TenantScope,
) -> Result<TrackerSnapshot, RepositoryError> {
    let chapters = ChapterRepository::new(db);

    let Some(organization_id) = scope.organization_id() else {
        return Ok(TrackerSnapshot::catalog_only(chapters.list().await?));
    };

    let readers = ReaderRepository::new(db);
    let assignments = AssignmentRepository::new(db);

    let (chapters, readers, assignments) = tokio::try_join!(
        chapters.list(),
        readers.list(organization_id),
        assignments.list(organization_id),
    )?;

    Ok(TrackerSnapshot {
        chapters,
        readers,
        assignments,
    })
}
