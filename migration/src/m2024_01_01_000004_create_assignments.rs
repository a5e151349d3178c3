//! Migration to create the assignments table.
//!
//! An assignment binds one reader to one chapter inside one organization. The
//! unique index on `(organization_id, chapter_id)` guarantees that a chapter is
//! held by at most one reader per organization, and deleting a reader cascades
//! to its assignments.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::ReaderId).uuid().not_null())
                    .col(ColumnDef::new(Assignments::ChapterId).integer().not_null())
                    .col(
                        ColumnDef::new(Assignments::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Assignments::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Assignments::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Assignments::Notes).text().null())
                    .col(
                        ColumnDef::new(Assignments::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_reader_id")
                            .from(Assignments::Table, Assignments::ReaderId)
                            .to(Readers::Table, Readers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_chapter_id")
                            .from(Assignments::Table, Assignments::ChapterId)
                            .to(Chapters::Table, Chapters::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_organization_id")
                            .from(Assignments::Table, Assignments::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One active assignment per chapter per organization
        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_organization_chapter")
                    .table(Assignments::Table)
                    .col(Assignments::OrganizationId)
                    .col(Assignments::ChapterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_reader_id")
                    .table(Assignments::Table)
                    .col(Assignments::ReaderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_assignments_organization_chapter")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_assignments_reader_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Id,
    ReaderId,
    ChapterId,
    Status,
    AssignedAt,
    CompletedAt,
    Notes,
    OrganizationId,
}

#[derive(DeriveIden)]
enum Readers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Chapters {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}
