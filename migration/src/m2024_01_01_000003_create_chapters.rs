//! Migration to create and seed the global chapters catalog.
//!
//! The catalog is fixed: exactly 30 rows (`Juz 1` .. `Juz 30`), not scoped to
//! any organization and never modified at runtime.

use sea_orm_migration::prelude::*;

const CHAPTER_COUNT: i32 = 30;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Chapters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chapters::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chapters::Name).text().not_null())
                    .col(
                        ColumnDef::new(Chapters::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Chapters::Table)
            .columns([Chapters::Id, Chapters::Name]);
        for id in 1..=CHAPTER_COUNT {
            seed.values_panic([id.into(), format!("Juz {id}").into()]);
        }

        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chapters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Chapters {
    Table,
    Id,
    Name,
    CreatedAt,
}
