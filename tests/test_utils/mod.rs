//! Test utilities for database and API testing.
//!
//! Provides an in-memory SQLite database with migrations applied (which also
//! seeds the 30-chapter catalog), plus helpers to create organizations,
//! members and session tokens.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use juz_tracker::auth::issue_session_token;
use juz_tracker::config::AppConfig;
use juz_tracker::identity::{DisabledIdentityProvider, IdentityProvider};
use juz_tracker::repositories::{NewReader, OrganizationRepository, ReaderRepository};
use juz_tracker::server::AppState;
use juz_tracker::tracker::{OrganizationId, Reader};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// SQLite foreign keys stay enabled so reader deletion cascades to assignments
/// exactly as it does in Postgres.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub async fn setup_test_state() -> Result<AppState> {
    setup_test_state_with_identity(Arc::new(DisabledIdentityProvider)).await
}

pub async fn setup_test_state_with_identity(
    identity: Arc<dyn IdentityProvider>,
) -> Result<AppState> {
    let db = setup_test_db().await?;
    Ok(AppState::new(test_config(), db, identity))
}

/// Creates an organization with `user_id` as its member.
pub async fn create_test_organization(
    db: &DatabaseConnection,
    name: &str,
    user_id: Uuid,
) -> Result<OrganizationId> {
    let organization = OrganizationRepository::new(db)
        .create_for_user(name, user_id)
        .await?;
    Ok(OrganizationId(organization.id))
}

pub async fn create_test_reader(
    db: &DatabaseConnection,
    organization_id: OrganizationId,
    name: &str,
) -> Result<Reader> {
    let reader = ReaderRepository::new(db)
        .create(
            organization_id,
            NewReader {
                name: name.to_string(),
                ..NewReader::default()
            },
        )
        .await?;
    Ok(reader)
}

pub fn bearer_for(user_id: Uuid) -> String {
    let token = issue_session_token(&test_config(), user_id, None, Duration::from_secs(600))
        .expect("test token signs");
    format!("Bearer {token}")
}
