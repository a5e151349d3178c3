//! # Tracker Domain
//!
//! Pure domain types and rules for distributing the 30 Juz among readers:
//! the assignment status ring, tenant scoping, progress aggregation and the
//! reader colour palette. Nothing in this module performs I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod palette;
pub mod progress;
pub mod scope;
pub mod snapshot;
pub mod status;

pub use progress::{ProgressSummary, ReaderProgress, TOTAL_CHAPTERS, summarize};
pub use scope::{OrganizationId, ScopeResolutionError, TenantScope};
pub use snapshot::TrackerSnapshot;
pub use status::{AssignmentStatus, StatusChange, UnknownStatus};

/// A person who can be assigned chapters, owned by one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reader {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    /// Hex colour from the reader palette
    #[schema(example = "#FF6B6B")]
    pub color: String,
    #[schema(value_type = String)]
    pub organization_id: OrganizationId,
    pub created_at: DateTime<Utc>,
}

/// One entry of the fixed, global chapter catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Chapter {
    #[schema(example = 1, minimum = 1, maximum = 30)]
    pub id: i32,
    #[schema(example = "Juz 1")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Binding of one reader to one chapter within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub reader_id: Uuid,
    pub chapter_id: i32,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    /// Set exactly when `status` is `completed`
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[schema(value_type = String)]
    pub organization_id: OrganizationId,
}

impl Assignment {
    /// Computes the next position on the status ring for this assignment.
    pub fn advance(&self, now: DateTime<Utc>) -> StatusChange {
        status::advance(self.status, now)
    }
}

/// Returns true when `chapter_id` names one of the catalog chapters.
pub fn is_valid_chapter_id(chapter_id: i32) -> bool {
    (1..=TOTAL_CHAPTERS as i32).contains(&chapter_id)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn org() -> OrganizationId {
        OrganizationId(Uuid::new_v4())
    }

    pub fn reader(organization_id: OrganizationId, name: &str, color: &str) -> Reader {
        Reader {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: None,
            color: color.to_string(),
            organization_id,
            created_at: Utc::now(),
        }
    }

    pub fn assignment(
        reader: &Reader,
        chapter_id: i32,
        status: AssignmentStatus,
    ) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            reader_id: reader.id,
            chapter_id,
            status,
            assigned_at: Utc::now(),
            completed_at: status.is_completed().then(Utc::now),
            notes: None,
            organization_id: reader.organization_id,
        }
    }
}
