//! Schedule plans.
//!
//! A `Plan` is the witness produced by a successful search: one assignment
//! per task, placing it with a worker on a day. Plans carry the worker
//! count and horizon they were built against, so they can be grouped and
//! printed without the originating problem.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TaskId;

/// Placement of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Task being placed.
    pub task: TaskId,
    /// Worker performing it, 1-based.
    pub worker: usize,
    /// Day it runs on, 0-based.
    pub day: usize,
}

/// A complete placement of every task in a problem.
///
/// The day a task is assigned to is also its completion day: work does
/// not span days, so "runs on day d" and "done by end of day d" coincide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    workers: usize,
    horizon: usize,
    assignments: Vec<Assignment>,
}

impl Plan {
    /// Creates an empty plan for the given grid.
    pub fn new(workers: usize, horizon: usize) -> Self {
        Self {
            workers,
            horizon,
            assignments: Vec::new(),
        }
    }

    /// Appends one assignment.
    pub fn push(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// All assignments, in the order the search committed them.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Number of workers the plan was built for.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of days the plan was built against.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of placed tasks.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the plan places no tasks.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Tasks the given worker performs on the given day, ascending.
    pub fn tasks_for(&self, worker: usize, day: usize) -> Vec<TaskId> {
        let mut tasks: Vec<TaskId> = self
            .assignments
            .iter()
            .filter(|a| a.worker == worker && a.day == day)
            .map(|a| a.task)
            .collect();
        tasks.sort();
        tasks
    }

    /// Day the given task completes on, if it is placed.
    pub fn completion_day(&self, task: TaskId) -> Option<usize> {
        self.assignments
            .iter()
            .find(|a| a.task == task)
            .map(|a| a.day)
    }

    /// Count of days up to and including the last day with any work.
    /// Zero for an empty plan.
    pub fn days_used(&self) -> usize {
        self.assignments
            .iter()
            .map(|a| a.day + 1)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Plan {
    /// Renders the plan day by day, 1-based for human consumption.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        for day in 0..self.horizon {
            lines.push(format!("Day {}:", day + 1));
            let mut any = false;
            for worker in 1..=self.workers {
                let tasks = self.tasks_for(worker, day);
                if tasks.is_empty() {
                    continue;
                }
                any = true;
                let joined = tasks
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!("  Worker {worker}: {joined}"));
            }
            if !any {
                lines.push("  No assignments scheduled".to_string());
            }
        }
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Plan {
        let mut plan = Plan::new(2, 3);
        plan.push(Assignment {
            task: TaskId::new(3),
            worker: 1,
            day: 0,
        });
        plan.push(Assignment {
            task: TaskId::new(1),
            worker: 1,
            day: 0,
        });
        plan.push(Assignment {
            task: TaskId::new(2),
            worker: 2,
            day: 2,
        });
        plan
    }

    #[test]
    fn test_grouping_and_lookup() {
        let plan = sample();
        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.tasks_for(1, 0),
            vec![TaskId::new(1), TaskId::new(3)]
        );
        assert!(plan.tasks_for(2, 0).is_empty());
        assert_eq!(plan.completion_day(TaskId::new(2)), Some(2));
        assert_eq!(plan.completion_day(TaskId::new(9)), None);
        assert_eq!(plan.days_used(), 3);
    }

    #[test]
    fn test_days_used_ignores_trailing_empty_days() {
        let mut plan = Plan::new(1, 5);
        plan.push(Assignment {
            task: TaskId::new(1),
            worker: 1,
            day: 1,
        });
        assert_eq!(plan.days_used(), 2);
        assert_eq!(Plan::new(3, 4).days_used(), 0);
    }

    #[test]
    fn test_display_format() {
        let rendered = sample().to_string();
        let expected = "\
Day 1:
  Worker 1: 1, 3
Day 2:
  No assignments scheduled
Day 3:
  Worker 2: 2";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["workers"], 2);
        assert_eq!(json["horizon"], 3);
        assert_eq!(json["assignments"][0]["task"], 3);
        assert_eq!(json["assignments"][0]["worker"], 1);
        assert_eq!(json["assignments"][0]["day"], 0);
    }
}
