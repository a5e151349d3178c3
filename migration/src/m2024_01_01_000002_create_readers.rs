//! Migration to create the readers table.
//!
//! Readers are organization-scoped people who can be assigned chapters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Readers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Readers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Readers::Name).text().not_null())
                    .col(ColumnDef::new(Readers::Email).text().null())
                    .col(ColumnDef::new(Readers::Color).text().not_null())
                    .col(ColumnDef::new(Readers::OrganizationId).uuid().not_null())
                    .col(
                        ColumnDef::new(Readers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_readers_organization_id")
                            .from(Readers::Table, Readers::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_readers_organization_id")
                    .table(Readers::Table)
                    .col(Readers::OrganizationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_readers_organization_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Readers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Readers {
    Table,
    Id,
    Name,
    Email,
    Color,
    OrganizationId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}
