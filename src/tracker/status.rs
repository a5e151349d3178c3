//! Assignment status ring.
//!
//! Status moves only forward around `pending -> in_progress -> completed`,
//! wrapping back to `pending`. There is no terminal state and no way to jump
//! to an arbitrary status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Progress state of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    Completed,
}

/// Raised when a stored or submitted status is outside the allowed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown assignment status '{0}'")]
pub struct UnknownStatus(pub String);

/// Result of advancing an assignment: the new status and its completion stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: AssignmentStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AssignmentStatus {
    /// Fixed order of the ring.
    pub const CYCLE: [AssignmentStatus; 3] = [
        AssignmentStatus::Pending,
        AssignmentStatus::InProgress,
        AssignmentStatus::Completed,
    ];

    /// Next status on the ring.
    pub fn next(self) -> Self {
        match self {
            AssignmentStatus::Pending => AssignmentStatus::InProgress,
            AssignmentStatus::InProgress => AssignmentStatus::Completed,
            AssignmentStatus::Completed => AssignmentStatus::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Completed => "completed",
        }
    }

    pub fn is_completed(self) -> bool {
        self == AssignmentStatus::Completed
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::CYCLE
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Moves `current` one step around the ring.
///
/// Entering `completed` stamps `completed_at` with `now`; every other target
/// clears it.
pub fn advance(current: AssignmentStatus, now: DateTime<Utc>) -> StatusChange {
    let status = current.next();
    StatusChange {
        status,
        completed_at: status.is_completed().then_some(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_order_wraps_to_pending() {
        assert_eq!(AssignmentStatus::Pending.next(), AssignmentStatus::InProgress);
        assert_eq!(AssignmentStatus::InProgress.next(), AssignmentStatus::Completed);
        assert_eq!(AssignmentStatus::Completed.next(), AssignmentStatus::Pending);
    }

    #[test]
    fn completed_at_tracks_completed_status_over_many_steps() {
        let mut status = AssignmentStatus::Pending;
        let mut completed_at = None;

        for step in 0..100 {
            let now = Utc::now();
            let change = advance(status, now);
            assert_eq!(change.status, AssignmentStatus::CYCLE[(step + 1) % 3]);
            assert_eq!(change.completed_at.is_some(), change.status.is_completed());
            if change.status.is_completed() {
                assert_eq!(change.completed_at, Some(now));
            }
            status = change.status;
            completed_at = change.completed_at;
        }

        // 100 steps from pending lands on in_progress (100 % 3 == 1)
        assert_eq!(status, AssignmentStatus::InProgress);
        assert!(completed_at.is_none());
    }

    #[test]
    fn leaving_completed_clears_timestamp() {
        let change = advance(AssignmentStatus::Completed, Utc::now());
        assert_eq!(change.status, AssignmentStatus::Pending);
        assert_eq!(change.completed_at, None);
    }

    #[test]
    fn parses_only_known_statuses() {
        for status in AssignmentStatus::CYCLE {
            assert_eq!(status.as_str().parse::<AssignmentStatus>(), Ok(status));
        }

        assert_eq!(
            "done".parse::<AssignmentStatus>(),
            Err(UnknownStatus("done".to_string()))
        );
        assert!("Pending".parse::<AssignmentStatus>().is_err());
        assert!("".parse::<AssignmentStatus>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&AssignmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: Result<AssignmentStatus, _> = serde_json::from_str("\"archived\"");
        assert!(parsed.is_err());
    }
}
