//! Tests ensuring organizations never see or modify each other's data.

use anyhow::Result;
use juz_tracker::error::RepositoryError;
use juz_tracker::repositories::{
    AssignmentRepository, NewAssignment, ReaderRepository, load_snapshot,
};
use juz_tracker::tracker::{TenantScope, TOTAL_CHAPTERS};
use uuid::Uuid;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{create_test_organization, create_test_reader, setup_test_db};

fn chapter(chapter_id: i32, reader_id: Uuid) -> NewAssignment {
    NewAssignment {
        chapter_id,
        reader_id,
        notes: None,
    }
}

#[tokio::test]
async fn same_chapter_can_be_assigned_in_each_organization() -> Result<()> {
    let db = setup_test_db().await?;
    let org_a = create_test_organization(&db, "A", Uuid::new_v4()).await?;
    let org_b = create_test_organization(&db, "B", Uuid::new_v4()).await?;
    let reader_a = create_test_reader(&db, org_a, "Amina").await?;
    let reader_b = create_test_reader(&db, org_b, "Bilal").await?;

    let assignments = AssignmentRepository::new(&db);
    assignments.assign(org_a, chapter(5, reader_a.id)).await?;
    assignments.assign(org_b, chapter(5, reader_b.id)).await?;

    assert_eq!(assignments.list(org_a).await?.len(), 1);
    assert_eq!(assignments.list(org_b).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn deleting_reader_in_one_organization_keeps_other_assignment() -> Result<()> {
    let db = setup_test_db().await?;
    let org_a = create_test_organization(&db, "A", Uuid::new_v4()).await?;
    let org_b = create_test_organization(&db, "B", Uuid::new_v4()).await?;
    let reader_a = create_test_reader(&db, org_a, "Amina").await?;
    let reader_b = create_test_reader(&db, org_b, "Bilal").await?;

    let assignments = AssignmentRepository::new(&db);
    assignments.assign(org_a, chapter(5, reader_a.id)).await?;
    let kept = assignments.assign(org_b, chapter(5, reader_b.id)).await?;

    ReaderRepository::new(&db).delete(org_a, reader_a.id).await?;

    assert!(assignments.list(org_a).await?.is_empty());
    let remaining = assignments.list(org_b).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
    Ok(())
}

#[tokio::test]
async fn bulk_remove_readers_is_scoped_to_caller_organization() -> Result<()> {
    let db = setup_test_db().await?;
    let org_a = create_test_organization(&db, "A", Uuid::new_v4()).await?;
    let org_b = create_test_organization(&db, "B", Uuid::new_v4()).await?;

    let a1 = create_test_reader(&db, org_a, "Amina").await?;
    create_test_reader(&db, org_a, "Anas").await?;
    let b1 = create_test_reader(&db, org_b, "Bilal").await?;
    let b2 = create_test_reader(&db, org_b, "Basma").await?;

    let assignments = AssignmentRepository::new(&db);
    assignments.assign(org_a, chapter(1, a1.id)).await?;
    assignments.assign(org_b, chapter(1, b1.id)).await?;
    assignments.assign(org_b, chapter(2, b2.id)).await?;

    let readers = ReaderRepository::new(&db);
    let removed = readers.delete_all(org_a).await?;

    assert_eq!(removed, 2);
    assert!(readers.list(org_a).await?.is_empty());
    assert!(assignments.list(org_a).await?.is_empty());
    assert_eq!(readers.list(org_b).await?.len(), 2);
    assert_eq!(assignments.list(org_b).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn foreign_reader_cannot_be_assigned() -> Result<()> {
    let db = setup_test_db().await?;
    let org_a = create_test_organization(&db, "A", Uuid::new_v4()).await?;
    let org_b = create_test_organization(&db, "B", Uuid::new_v4()).await?;
    let reader_b = create_test_reader(&db, org_b, "Bilal").await?;

    let err = AssignmentRepository::new(&db)
        .assign(org_a, chapter(3, reader_b.id))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn foreign_ids_are_not_found() -> Result<()> {
    let db = setup_test_db().await?;
    let org_a = create_test_organization(&db, "A", Uuid::new_v4()).await?;
    let org_b = create_test_organization(&db, "B", Uuid::new_v4()).await?;
    let reader_b = create_test_reader(&db, org_b, "Bilal").await?;
    let assignments = AssignmentRepository::new(&db);
    let held = assignments.assign(org_b, chapter(9, reader_b.id)).await?;

    let readers = ReaderRepository::new(&db);
    assert!(matches!(
        readers.delete(org_a, reader_b.id).await,
        Err(RepositoryError::NotFound(_))
    ));
    assert!(matches!(
        assignments.advance(org_a, held.id, chrono::Utc::now()).await,
        Err(RepositoryError::NotFound(_))
    ));
    assert!(matches!(
        assignments.unassign(org_a, held.id).await,
        Err(RepositoryError::NotFound(_))
    ));

    // Nothing changed for the owner.
    assert_eq!(readers.list(org_b).await?.len(), 1);
    let owned = assignments.list(org_b).await?;
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, held.id);
    assert_eq!(owned[0].status, held.status);
    Ok(())
}

#[tokio::test]
async fn unaffiliated_snapshot_has_catalog_only() -> Result<()> {
    let db = setup_test_db().await?;
    let org_a = create_test_organization(&db, "A", Uuid::new_v4()).await?;
    let reader = create_test_reader(&db, org_a, "Amina").await?;
    AssignmentRepository::new(&db)
        .assign(org_a, chapter(1, reader.id))
        .await?;

    let snapshot = load_snapshot(&db, TenantScope::Unaffiliated).await?;

    assert_eq!(snapshot.chapters.len(), TOTAL_CHAPTERS as usize);
    assert!(snapshot.readers.is_empty());
    assert!(snapshot.assignments.is_empty());
    assert_eq!(snapshot.progress().unassigned, TOTAL_CHAPTERS);
    Ok(())
}

#[tokio::test]
async fn snapshot_contains_only_own_organization() -> Result<()> {
    let db = setup_test_db().await?;
    let org_a = create_test_organization(&db, "A", Uuid::new_v4()).await?;
    let org_b = create_test_organization(&db, "B", Uuid::new_v4()).await?;
    let reader_a = create_test_reader(&db, org_a, "Amina").await?;
    let reader_b = create_test_reader(&db, org_b, "Bilal").await?;
    let assignments = AssignmentRepository::new(&db);
    assignments.assign(org_a, chapter(1, reader_a.id)).await?;
    assignments.assign(org_b, chapter(2, reader_b.id)).await?;
    assignments.assign(org_b, chapter(3, reader_b.id)).await?;

    let snapshot = load_snapshot(&db, TenantScope::Organization(org_a)).await?;

    assert_eq!(snapshot.readers.len(), 1);
    assert_eq!(snapshot.readers[0].id, reader_a.id);
    assert_eq!(snapshot.assignments.len(), 1);
    assert!(snapshot.assignments.iter().all(|a| a.organization_id == org_a));
    assert_eq!(snapshot.progress().assigned, 1);
    Ok(())
}
