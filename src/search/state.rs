//! Mutable search state for one fixed-parameter trial.
//!
//! `ScheduleState` tracks the budget grid (one cell per worker and day),
//! the set of committed tasks with their completion days, and a LIFO
//! trail of commitments so the engines can backtrack step by step
//! without cloning the grid.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Assignment, Plan, Task, TaskId};

/// One committed placement, recorded on the trail for undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment {
    /// Task that was placed.
    pub task: TaskId,
    /// Worker index, 0-based.
    pub worker: usize,
    /// Day, 0-based.
    pub day: usize,
    /// Budget units deducted.
    pub cost: u32,
}

/// Budget grid plus completion bookkeeping for a trial with fixed
/// worker count, daily budget and horizon.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    workers: usize,
    horizon: usize,
    daily_budget: u32,
    /// Remaining budget per cell, worker-major: cell = worker * horizon + day.
    remaining: Vec<u32>,
    completed: BTreeSet<TaskId>,
    completion_day: BTreeMap<TaskId, usize>,
    trail: Vec<Commitment>,
}

impl ScheduleState {
    /// Creates a fresh state with every cell at the full daily budget.
    pub fn new(workers: usize, horizon: usize, daily_budget: u32) -> Self {
        Self {
            workers,
            horizon,
            daily_budget,
            remaining: vec![daily_budget; workers * horizon],
            completed: BTreeSet::new(),
            completion_day: BTreeMap::new(),
            trail: Vec::new(),
        }
    }

    fn cell(&self, worker: usize, day: usize) -> usize {
        debug_assert!(worker < self.workers && day < self.horizon);
        worker * self.horizon + day
    }

    /// Remaining budget in one cell.
    pub fn remaining(&self, worker: usize, day: usize) -> u32 {
        self.remaining[self.cell(worker, day)]
    }

    /// Number of workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of days.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Budget each cell starts from.
    pub fn daily_budget(&self) -> u32 {
        self.daily_budget
    }

    /// Deducts `cost` from a cell if it fits. Returns whether it did.
    pub fn try_assign(&mut self, worker: usize, day: usize, cost: u32) -> bool {
        let cell = self.cell(worker, day);
        if self.remaining[cell] < cost {
            return false;
        }
        self.remaining[cell] -= cost;
        true
    }

    /// Restores `cost` to a cell. Inverse of a successful [`ScheduleState::try_assign`].
    pub fn undo_assign(&mut self, worker: usize, day: usize, cost: u32) {
        let cell = self.cell(worker, day);
        self.remaining[cell] += cost;
        debug_assert!(self.remaining[cell] <= self.daily_budget);
    }

    /// Commits a task placement: budget deduction plus completion
    /// bookkeeping, recorded on the trail. Returns `false` and changes
    /// nothing when the cell cannot absorb the cost.
    pub fn commit(&mut self, task: TaskId, worker: usize, day: usize, cost: u32) -> bool {
        if !self.try_assign(worker, day, cost) {
            return false;
        }
        self.completed.insert(task);
        self.completion_day.insert(task, day);
        self.trail.push(Commitment {
            task,
            worker,
            day,
            cost,
        });
        true
    }

    /// Reverts the most recent commitment.
    pub fn uncommit(&mut self) -> Option<Commitment> {
        let last = self.trail.pop()?;
        self.undo_assign(last.worker, last.day, last.cost);
        self.completed.remove(&last.task);
        self.completion_day.remove(&last.task);
        Some(last)
    }

    /// Tasks committed so far.
    pub fn completed(&self) -> &BTreeSet<TaskId> {
        &self.completed
    }

    /// Completion day of every committed task.
    pub fn completion_days(&self) -> &BTreeMap<TaskId, usize> {
        &self.completion_day
    }

    /// Number of committed tasks.
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Whether `task` may run on `day`: every dependency is committed,
    /// and when the next-day rule is on, committed to a strictly
    /// earlier day.
    pub fn placeable_on(&self, task: &Task, day: usize, next_day_rule: bool) -> bool {
        task.deps
            .iter()
            .all(|dep| match self.completion_day.get(dep) {
                Some(&done) => !next_day_rule || done < day,
                None => false,
            })
    }

    /// Whether the state is back to its freshly-built condition.
    pub fn is_pristine(&self) -> bool {
        self.trail.is_empty()
            && self.completed.is_empty()
            && self.remaining.iter().all(|&r| r == self.daily_budget)
    }

    /// Flattened budget grid, worker-major. The memoizer keys on this.
    pub fn budget_grid(&self) -> &[u32] {
        &self.remaining
    }

    /// Per-worker rows of the budget grid.
    pub fn worker_rows(&self) -> impl Iterator<Item = &[u32]> {
        self.remaining.chunks(self.horizon.max(1))
    }

    /// Builds the plan described by the current trail, converting worker
    /// indices to their 1-based public form.
    pub fn snapshot_plan(&self) -> Plan {
        let mut plan = Plan::new(self.workers, self.horizon);
        for c in &self.trail {
            plan.push(Assignment {
                task: c.task,
                worker: c.worker + 1,
                day: c.day,
            });
        }
        plan
    }
}
