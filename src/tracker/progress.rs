//! Progress aggregation over a snapshot of readers and assignments.
//!
//! Everything here is a pure function of its inputs and the fixed catalog
//! size, recomputed on every refresh.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Assignment, AssignmentStatus, Reader};

/// Number of chapters in the catalog.
pub const TOTAL_CHAPTERS: u32 = 30;

/// Completion figures for a single reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReaderProgress {
    #[schema(value_type = String)]
    pub reader_id: Uuid,
    pub name: String,
    pub color: String,
    pub completed: u32,
    pub total: u32,
}

/// Summary counts for one organization's assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProgressSummary {
    #[schema(example = 30)]
    pub total_chapters: u32,
    pub assigned: u32,
    pub unassigned: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
    /// `round(100 * completed / 30)`
    #[schema(minimum = 0, maximum = 100)]
    pub completion_percentage: u32,
    /// Readers holding at least one assignment, in the order supplied
    pub readers: Vec<ReaderProgress>,
}

/// Rounded share of completed chapters, as a whole percentage.
pub fn completion_percentage(completed: u32) -> u32 {
    // Half-up rounding in integers; 100 * c / 30 never lands on .5 exactly
    (completed * 100 + TOTAL_CHAPTERS / 2) / TOTAL_CHAPTERS
}

/// Aggregates status counts and per-reader progress.
pub fn summarize(assignments: &[Assignment], readers: &[Reader]) -> ProgressSummary {
    let count = |status: AssignmentStatus| {
        assignments.iter().filter(|a| a.status == status).count() as u32
    };

    let assigned = assignments.len() as u32;
    let completed = count(AssignmentStatus::Completed);

    let readers = readers
        .iter()
        .filter_map(|reader| {
            let (total, done) = assignments
                .iter()
                .filter(|a| a.reader_id == reader.id)
                .fold((0u32, 0u32), |(total, done), a| {
                    (total + 1, done + u32::from(a.status.is_completed()))
                });

            (total > 0).then(|| ReaderProgress {
                reader_id: reader.id,
                name: reader.name.clone(),
                color: reader.color.clone(),
                completed: done,
                total,
            })
        })
        .collect();

    ProgressSummary {
        total_chapters: TOTAL_CHAPTERS,
        assigned,
        unassigned: TOTAL_CHAPTERS.saturating_sub(assigned),
        pending: count(AssignmentStatus::Pending),
        in_progress: count(AssignmentStatus::InProgress),
        completed,
        completion_percentage: completion_percentage(completed),
        readers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::fixtures::{assignment, org, reader};

    #[test]
    fn empty_snapshot_is_all_unassigned() {
        let summary = summarize(&[], &[]);

        assert_eq!(summary.unassigned, 30);
        assert_eq!(summary.assigned, 0);
        assert_eq!(summary.completion_percentage, 0);
        assert!(summary.readers.is_empty());
    }

    #[test]
    fn completion_percentage_rounds_against_thirty() {
        assert_eq!(completion_percentage(0), 0);
        assert_eq!(completion_percentage(1), 3);
        assert_eq!(completion_percentage(2), 7);
        assert_eq!(completion_percentage(9), 30);
        assert_eq!(completion_percentage(15), 50);
        assert_eq!(completion_percentage(29), 97);
        assert_eq!(completion_percentage(30), 100);

        for completed in 0..=30u32 {
            let expected = (100.0 * completed as f64 / 30.0).round() as u32;
            assert_eq!(completion_percentage(completed), expected);
        }
    }

    #[test]
    fn counts_partition_assignments() {
        let org = org();
        let alice = reader(org, "Alice", "#FF6B6B");
        let statuses = [
            AssignmentStatus::Pending,
            AssignmentStatus::InProgress,
            AssignmentStatus::Completed,
        ];

        let assignments: Vec<_> = (1..=17)
            .map(|chapter| assignment(&alice, chapter, statuses[chapter as usize % 3]))
            .collect();

        let summary = summarize(&assignments, std::slice::from_ref(&alice));

        assert_eq!(summary.assigned, 17);
        assert_eq!(summary.unassigned, 30 - 17);
        assert_eq!(
            summary.pending + summary.in_progress + summary.completed,
            summary.assigned
        );
        assert_eq!(summary.unassigned + summary.assigned, TOTAL_CHAPTERS);
    }

    #[test]
    fn per_reader_stats_skip_idle_readers_and_keep_order() {
        let org = org();
        let zaid = reader(org, "Zaid", "#4ECDC4");
        let idle = reader(org, "Idle", "#45B7D1");
        let amina = reader(org, "Amina", "#FF6B6B");

        let assignments = vec![
            assignment(&zaid, 1, AssignmentStatus::Completed),
            assignment(&zaid, 2, AssignmentStatus::Completed),
            assignment(&zaid, 3, AssignmentStatus::Pending),
            assignment(&amina, 4, AssignmentStatus::InProgress),
        ];

        let summary = summarize(&assignments, &[zaid.clone(), idle, amina.clone()]);

        assert_eq!(summary.readers.len(), 2);
        assert_eq!(summary.readers[0].reader_id, zaid.id);
        assert_eq!(summary.readers[0].completed, 2);
        assert_eq!(summary.readers[0].total, 3);
        assert_eq!(summary.readers[1].reader_id, amina.id);
        assert_eq!(summary.readers[1].completed, 0);
        assert_eq!(summary.readers[1].total, 1);
        assert_eq!(summary.completion_percentage, 7);
    }

    #[test]
    fn full_completion_is_one_hundred_percent() {
        let org = org();
        let alice = reader(org, "Alice", "#FF6B6B");
        let assignments: Vec<_> = (1..=30)
            .map(|chapter| assignment(&alice, chapter, AssignmentStatus::Completed))
            .collect();

        let summary = summarize(&assignments, &[alice]);

        assert_eq!(summary.unassigned, 0);
        assert_eq!(summary.completed, 30);
        assert_eq!(summary.completion_percentage, 100);
        assert_eq!(summary.readers[0].total, 30);
    }
}
