//! Visited-state dedup for the backtracking engine.
//!
//! Two partial schedules that have completed the same task set and left
//! the same budget grid behind explore identical subtrees, so the
//! memoizer records a canonical key per visited state and the engine
//! expands each subtree once.
//!
//! When the next-day rule is on, the grid alone is not enough: states
//! can agree on completed tasks and budgets yet differ on completion
//! days, which changes which placements are legal downstream. The key is
//! widened with the completion-day map in that case.

use std::collections::HashSet;

use super::state::ScheduleState;
use crate::models::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StateKey {
    completed: Vec<TaskId>,
    grid: Vec<u32>,
    /// (task, completion day) pairs; populated only when completion days
    /// are part of the key.
    days: Vec<(TaskId, usize)>,
}

/// Records visited states and answers "seen before?".
#[derive(Debug, Default)]
pub struct Memoizer {
    seen: HashSet<StateKey>,
    canonical_workers: bool,
    track_days: bool,
}

impl Memoizer {
    /// Creates an empty memoizer keyed on completed tasks and the raw grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds worker-permuted grids into one key, so states that differ
    /// only by relabeling interchangeable workers dedup together.
    pub fn with_worker_canonicalization(mut self, on: bool) -> Self {
        self.canonical_workers = on;
        self
    }

    /// Widens the key with completion days. Required when the next-day
    /// rule is active.
    pub fn with_completion_days(mut self, on: bool) -> Self {
        self.track_days = on;
        self
    }

    /// Returns whether the state was already recorded, recording it if not.
    pub fn check_and_record(&mut self, state: &ScheduleState) -> bool {
        let key = self.key_of(state);
        !self.seen.insert(key)
    }

    /// Number of distinct states recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no state has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn key_of(&self, state: &ScheduleState) -> StateKey {
        let completed = state.completed().iter().copied().collect();
        let grid = if self.canonical_workers {
            let mut rows: Vec<&[u32]> = state.worker_rows().collect();
            rows.sort();
            rows.concat()
        } else {
            state.budget_grid().to_vec()
        };
        let days = if self.track_days {
            state
                .completion_days()
                .iter()
                .map(|(&t, &d)| (t, d))
                .collect()
        } else {
            Vec::new()
        };
        StateKey {
            completed,
            grid,
            days,
        }
    }
}
