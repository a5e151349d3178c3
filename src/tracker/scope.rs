//! Tenant scoping.
//!
//! Readers and assignments always travel with the organization that owns them.
//! An authenticated caller is resolved to a [`TenantScope`] once per request;
//! data access functions take an explicit [`OrganizationId`], so a caller
//! without a membership cannot reach them at all.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Organization identifier wrapper for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct OrganizationId(pub Uuid);

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for OrganizationId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// The authenticated user has no organization membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("caller has no organization membership")]
pub struct ScopeResolutionError;

/// Tenant context of a caller after membership lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    Organization(OrganizationId),
    /// Authenticated, but not a member of any organization
    Unaffiliated,
}

impl TenantScope {
    pub fn from_membership(organization_id: Option<OrganizationId>) -> Self {
        match organization_id {
            Some(id) => TenantScope::Organization(id),
            None => TenantScope::Unaffiliated,
        }
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            TenantScope::Organization(id) => Some(*id),
            TenantScope::Unaffiliated => None,
        }
    }

    /// Organization to scope a write to, or an error when there is none.
    pub fn require(&self) -> Result<OrganizationId, ScopeResolutionError> {
        self.organization_id().ok_or(ScopeResolutionError)
    }
}
