//! # Organization Repository
//!
//! Organizations and the user → organization membership used to resolve
//! the tenant of every authenticated request.

use crate::error::RepositoryError;
use crate::models::organization::{ActiveModel as OrganizationActiveModel, Model as OrganizationModel};
use crate::models::organization_member::ActiveModel as MemberActiveModel;
use crate::models::{OrganizationEntity, OrganizationMemberEntity};
use crate::tracker::OrganizationId;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use uuid::Uuid;

const MAX_NAME_LEN: usize = 255;

/// Repository for organization and membership operations
pub struct OrganizationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolve the single organization a user belongs to, if any.
    pub async fn find_membership(
        &self,
        user_id: Uuid,
    ) -> Result<Option<OrganizationId>, RepositoryError> {
        let membership = OrganizationMemberEntity::find_by_id(user_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(membership.map(|m| OrganizationId(m.organization_id)))
    }

    pub async fn get_by_id(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<OrganizationModel>, RepositoryError> {
        OrganizationEntity::find_by_id(organization_id.0)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Create an organization without members (operator use).
    pub async fn create(&self, name: &str) -> Result<OrganizationModel, RepositoryError> {
        let name = validate_name(name)?;
        insert_organization(self.db, name).await
    }

    /// Create an organization and make `user_id` its member in one transaction.
    ///
    /// Users belong to at most one organization; an existing membership is a conflict.
    pub async fn create_for_user(
        &self,
        name: &str,
        user_id: Uuid,
    ) -> Result<OrganizationModel, RepositoryError> {
        let name = validate_name(name)?;

        if self.find_membership(user_id).await?.is_some() {
            return Err(RepositoryError::Conflict(
                "User already belongs to an organization".to_string(),
            ));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let organization = insert_organization(&txn, name).await?;
        insert_member(&txn, OrganizationId(organization.id), user_id).await?;

        txn.commit().await.map_err(RepositoryError::database_error)?;

        tracing::info!(
            organization_id = %organization.id,
            user_id = %user_id,
            "Organization created"
        );
        Ok(organization)
    }

    /// Attach a user to an existing organization.
    pub async fn add_member(
        &self,
        organization_id: OrganizationId,
        user_id: Uuid,
    ) -> Result<(), RepositoryError> {
        if self.get_by_id(organization_id).await?.is_none() {
            return Err(RepositoryError::not_found("Organization not found"));
        }

        insert_member(self.db, organization_id, user_id)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => RepositoryError::Conflict(
                    "User already belongs to an organization".to_string(),
                ),
                other => other,
            })
    }
}

async fn insert_organization<C: ConnectionTrait>(
    db: &C,
    name: String,
) -> Result<OrganizationModel, RepositoryError> {
    OrganizationActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(RepositoryError::database_error)
}

async fn insert_member<C: ConnectionTrait>(
    db: &C,
    organization_id: OrganizationId,
    user_id: Uuid,
) -> Result<(), RepositoryError> {
    MemberActiveModel {
        user_id: Set(user_id),
        organization_id: Set(organization_id.0),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(RepositoryError::database_error)?;

    Ok(())
}

fn validate_name(name: &str) -> Result<String, RepositoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RepositoryError::validation_error(
            "Organization name cannot be empty",
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RepositoryError::validation_error(
            "Organization name cannot exceed 255 characters",
        ));
    }
    Ok(name.to_string())
}
