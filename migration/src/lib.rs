//! Database migrations for the Juz tracker.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_01_01_000001_create_organizations;
mod m2024_01_01_000002_create_readers;
mod m2024_01_01_000003_create_chapters;
mod m2024_01_01_000004_create_assignments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_01_01_000001_create_organizations::Migration),
            Box::new(m2024_01_01_000002_create_readers::Migration),
            Box::new(m2024_01_01_000003_create_chapters::Migration),
            Box::new(m2024_01_01_000004_create_assignments::Migration),
        ]
    }
}
