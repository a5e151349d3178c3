//! Application state for one organization at one point in time.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Assignment, Chapter, ProgressSummary, Reader, summarize};

/// Readers, chapters and assignments as fetched together for a caller.
///
/// Replaces any ambient/global store: the snapshot is loaded, handed to the
/// aggregator, and thrown away. With at most 30 assignments nothing is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrackerSnapshot {
    pub chapters: Vec<Chapter>,
    pub readers: Vec<Reader>,
    pub assignments: Vec<Assignment>,
}

impl TrackerSnapshot {
    /// Snapshot for a caller with no tenant context: the global catalog only.
    pub fn catalog_only(chapters: Vec<Chapter>) -> Self {
        Self {
            chapters,
            ..Default::default()
        }
    }

    pub fn assignment_for_chapter(&self, chapter_id: i32) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.chapter_id == chapter_id)
    }

    pub fn reader(&self, reader_id: Uuid) -> Option<&Reader> {
        self.readers.iter().find(|r| r.id == reader_id)
    }

    /// Chapters with no assignment in this snapshot, in catalog order.
    pub fn unassigned_chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters
            .iter()
            .filter(|chapter| self.assignment_for_chapter(chapter.id).is_none())
    }

    pub fn progress(&self) -> ProgressSummary {
        summarize(&self.assignments, &self.readers)
    }
}
