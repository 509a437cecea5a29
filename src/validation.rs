//! Plan validation.
//!
//! Checks a finished plan against the problem it claims to solve: every
//! task placed exactly once, placements inside the grid, cell budgets
//! respected, and dependency days strictly increasing when the next-day
//! rule applies. Without that rule days are unordered capacity buckets
//! and only completeness is required of dependencies. The engines
//! produce plans that pass by construction; the checker backs debug
//! assertions in the query drivers and callers that transport plans
//! across process boundaries.

use std::collections::{BTreeMap, HashMap};

use crate::models::{Plan, TaskGraph, TaskId};

/// Validation result: all violations found, not only the first.
pub type ValidationResult = Result<(), Vec<Violation>>;

/// A single way a plan disagrees with its problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Violation category.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of plan violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A task is missing from the plan or appears more than once.
    Coverage,
    /// A placement names a worker or day outside the grid.
    OutOfGrid,
    /// A worker/day cell holds more cost than the daily budget.
    OverBudget,
    /// Under the next-day rule, a task runs on or before the day one of
    /// its dependencies finishes.
    OrderViolation,
    /// The plan places a task the problem does not define.
    UnknownTask,
}

impl Violation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Checks `plan` against `graph` under the given budget and rule.
///
/// # Returns
/// `Ok(())` if the plan is a valid schedule, `Err(violations)` with
/// every detected issue otherwise.
pub fn validate_plan(
    plan: &Plan,
    graph: &TaskGraph,
    daily_budget: u32,
    next_day_rule: bool,
) -> ValidationResult {
    let mut violations = Vec::new();

    let mut placements: HashMap<TaskId, usize> = HashMap::new();
    for a in plan.assignments() {
        *placements.entry(a.task).or_insert(0) += 1;
        if graph.task(a.task).is_none() {
            violations.push(Violation::new(
                ViolationKind::UnknownTask,
                format!("plan places task {} which the problem does not define", a.task),
            ));
        }
        if a.worker == 0 || a.worker > plan.workers() {
            violations.push(Violation::new(
                ViolationKind::OutOfGrid,
                format!("task {} assigned to unknown worker {}", a.task, a.worker),
            ));
        }
        if a.day >= plan.horizon() {
            violations.push(Violation::new(
                ViolationKind::OutOfGrid,
                format!("task {} assigned beyond the horizon", a.task),
            ));
        }
    }

    for task in graph.tasks() {
        match placements.get(&task.id) {
            Some(1) => {}
            None => violations.push(Violation::new(
                ViolationKind::Coverage,
                format!("task {} is not placed", task.id),
            )),
            Some(n) => violations.push(Violation::new(
                ViolationKind::Coverage,
                format!("task {} is placed {n} times", task.id),
            )),
        }
    }

    let mut load: BTreeMap<(usize, usize), u64> = BTreeMap::new();
    for a in plan.assignments() {
        if let Some(task) = graph.task(a.task) {
            *load.entry((a.worker, a.day)).or_insert(0) += u64::from(task.cost);
        }
    }
    for ((worker, day), used) in load {
        if used > u64::from(daily_budget) {
            violations.push(Violation::new(
                ViolationKind::OverBudget,
                format!(
                    "worker {worker} holds {used} units on day {} (budget {daily_budget})",
                    day + 1
                ),
            ));
        }
    }

    if next_day_rule {
        for task in graph.tasks() {
            let Some(day) = plan.completion_day(task.id) else {
                continue;
            };
            for dep in &task.deps {
                let Some(dep_day) = plan.completion_day(*dep) else {
                    continue;
                };
                if dep_day >= day {
                    violations.push(Violation::new(
                        ViolationKind::OrderViolation,
                        format!(
                            "task {} runs on day {} but its dependency {} finishes day {}",
                            task.id,
                            day + 1,
                            dep,
                            dep_day + 1
                        ),
                    ));
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Task};

    fn fork_graph() -> TaskGraph {
        TaskGraph::load([
            Task::new(1, 2),
            Task::new(2, 2).with_dep(1),
            Task::new(3, 1).with_dep(1),
        ])
        .unwrap()
    }

    fn place(task: u32, worker: usize, day: usize) -> Assignment {
        Assignment {
            task: TaskId::new(task),
            worker,
            day,
        }
    }

    #[test]
    fn test_valid_plan() {
        let graph = fork_graph();
        let mut plan = Plan::new(1, 3);
        plan.push(place(1, 1, 0));
        plan.push(place(2, 1, 1));
        plan.push(place(3, 1, 2));
        assert!(validate_plan(&plan, &graph, 2, false).is_ok());
        assert!(validate_plan(&plan, &graph, 2, true).is_ok());
    }

    #[test]
    fn test_missing_task() {
        let graph = fork_graph();
        let mut plan = Plan::new(1, 3);
        plan.push(place(1, 1, 0));
        plan.push(place(2, 1, 1));
        let errors = validate_plan(&plan, &graph, 2, false).unwrap_err();
        assert!(errors.iter().any(|v| v.kind == ViolationKind::Coverage));
    }

    #[test]
    fn test_double_placement() {
        let graph = fork_graph();
        let mut plan = Plan::new(2, 3);
        plan.push(place(1, 1, 0));
        plan.push(place(1, 2, 0));
        plan.push(place(2, 1, 1));
        plan.push(place(3, 1, 2));
        let errors = validate_plan(&plan, &graph, 2, false).unwrap_err();
        assert!(errors
            .iter()
            .any(|v| v.kind == ViolationKind::Coverage && v.message.contains("2 times")));
    }

    #[test]
    fn test_over_budget_cell() {
        let graph = fork_graph();
        let mut plan = Plan::new(1, 2);
        plan.push(place(1, 1, 0));
        plan.push(place(2, 1, 1));
        plan.push(place(3, 1, 1));
        // Day 2 holds cost 2 + 1 against a budget of 2.
        let errors = validate_plan(&plan, &graph, 2, false).unwrap_err();
        assert!(errors.iter().any(|v| v.kind == ViolationKind::OverBudget));
    }

    #[test]
    fn test_dependency_on_a_later_day() {
        // Days are unordered buckets without the next-day rule, so a
        // dependency landing later is fine there and a violation with it.
        let graph = fork_graph();
        let mut plan = Plan::new(2, 2);
        plan.push(place(2, 1, 0));
        plan.push(place(1, 1, 1));
        plan.push(place(3, 2, 1));
        assert!(validate_plan(&plan, &graph, 2, false).is_ok());
        let errors = validate_plan(&plan, &graph, 2, true).unwrap_err();
        assert!(errors
            .iter()
            .any(|v| v.kind == ViolationKind::OrderViolation));
    }

    #[test]
    fn test_same_day_dependency_depends_on_rule() {
        let graph =
            TaskGraph::load([Task::new(1, 1), Task::new(2, 1).with_dep(1)]).unwrap();
        let mut plan = Plan::new(1, 1);
        plan.push(place(1, 1, 0));
        plan.push(place(2, 1, 0));

        assert!(validate_plan(&plan, &graph, 2, false).is_ok());
        let errors = validate_plan(&plan, &graph, 2, true).unwrap_err();
        assert!(errors
            .iter()
            .any(|v| v.kind == ViolationKind::OrderViolation));
    }

    #[test]
    fn test_unknown_task_and_grid_bounds() {
        let graph = TaskGraph::load([Task::new(1, 1)]).unwrap();
        let mut plan = Plan::new(1, 1);
        plan.push(place(1, 2, 3));
        plan.push(place(9, 1, 0));
        let errors = validate_plan(&plan, &graph, 2, false).unwrap_err();
        assert!(errors.iter().any(|v| v.kind == ViolationKind::UnknownTask));
        assert!(errors.iter().any(|v| v.kind == ViolationKind::OutOfGrid));
    }

    #[test]
    fn test_engine_witnesses_validate() {
        use crate::search::{BacktrackSearch, Feasibility, TrialParams};

        let graph = fork_graph();
        let params = TrialParams {
            workers: 2,
            daily_budget: 2,
            horizon: 3,
        };
        let mut search = BacktrackSearch::new(&graph, params).unwrap();
        match search.run() {
            Feasibility::Feasible(plan) => {
                assert!(validate_plan(&plan, &graph, 2, false).is_ok());
            }
            other => panic!("expected feasible, got {other:?}"),
        }
    }
}
