//! # Data Models
//!
//! SeaORM entities backing the tracker: organizations and their members,
//! readers, the chapter catalog and assignments.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod assignment;
pub mod chapter;
pub mod organization;
pub mod organization_member;
pub mod reader;

pub use assignment::Entity as AssignmentEntity;
pub use chapter::Entity as ChapterEntity;
pub use organization::Entity as OrganizationEntity;
pub use organization_member::Entity as OrganizationMemberEntity;
pub use reader::Entity as ReaderEntity;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "juz-tracker".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
