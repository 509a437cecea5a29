//! Query drivers over the search engines.
//!
//! Two questions are answered on top of fixed-parameter feasibility:
//!
//! * [`EarliestCompletion`] sweeps the horizon upward and reports the
//!   first feasible day count.
//! * [`MinimumCapacity`] binary-searches the daily budget at a fixed
//!   horizon.
//!
//! Both questions are monotone in their parameter: an extra day can stay
//! idle and a larger budget only loosens cells, which is what makes the
//! sweep minimum and the bisection sound. One search budget is shared
//! across all trials of a query; a breach in any trial surfaces as
//! [`ScheduleResult::Timeout`].

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{Plan, TaskGraph};
use crate::search::{BacktrackSearch, Feasibility, SearchBudget, SearchOptions, TrialParams};
use crate::validation::validate_plan;

/// Answer to a scheduling query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleResult {
    /// The optimal value, with a witness plan achieving it.
    Optimal { value: u64, plan: Plan },
    /// No value in the query's range admits a schedule.
    Unsat,
    /// The search budget ran out before the answer was proven.
    Timeout,
}

impl ScheduleResult {
    /// Whether an optimum was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal { .. })
    }
}

/// Smallest horizon, in days, within which every task can complete.
#[derive(Debug)]
pub struct EarliestCompletion<'g> {
    graph: &'g TaskGraph,
    workers: usize,
    daily_budget: u32,
    options: SearchOptions,
    budget: SearchBudget,
}

impl<'g> EarliestCompletion<'g> {
    /// Prepares the query for a worker count and daily budget.
    pub fn new(graph: &'g TaskGraph, workers: usize, daily_budget: u32) -> Self {
        Self {
            graph,
            workers,
            daily_budget,
            options: SearchOptions::default(),
            budget: SearchBudget::UNLIMITED,
        }
    }

    /// Replaces the default engine options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Caps the node and wall-clock spend across all trials.
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Sweeps horizons 1 through `max_horizon` inclusive.
    ///
    /// A problem with no tasks completes in zero days without searching.
    pub fn run(&self, max_horizon: usize) -> Result<ScheduleResult> {
        self.graph.ensure_acyclic()?;
        if self.graph.is_empty() {
            return Ok(ScheduleResult::Optimal {
                value: 0,
                plan: Plan::new(self.workers, 0),
            });
        }

        let started = Instant::now();
        let mut nodes_left = self.budget.max_nodes;
        for horizon in 1..=max_horizon {
            if deadline_passed(&self.budget, started) {
                return Ok(ScheduleResult::Timeout);
            }
            let params = TrialParams {
                workers: self.workers,
                daily_budget: self.daily_budget,
                horizon,
            };
            let mut search = BacktrackSearch::new(self.graph, params)?
                .with_options(self.options)
                .with_budget(remaining_budget(&self.budget, nodes_left, started));
            match search.run() {
                Feasibility::Feasible(plan) => {
                    debug_assert!(validate_plan(
                        &plan,
                        self.graph,
                        self.daily_budget,
                        self.options.next_day_rule
                    )
                    .is_ok());
                    debug!(horizon, "earliest completion found");
                    return Ok(ScheduleResult::Optimal {
                        value: horizon as u64,
                        plan,
                    });
                }
                Feasibility::LimitReached => {
                    debug!(horizon, "search budget exhausted during sweep");
                    return Ok(ScheduleResult::Timeout);
                }
                Feasibility::Infeasible => {
                    debug!(horizon, nodes = search.stats().nodes_expanded, "horizon infeasible");
                    nodes_left =
                        nodes_left.map(|n| n.saturating_sub(search.stats().nodes_expanded));
                }
            }
        }
        Ok(ScheduleResult::Unsat)
    }
}

/// Smallest daily budget admitting a schedule within a fixed horizon.
#[derive(Debug)]
pub struct MinimumCapacity<'g> {
    graph: &'g TaskGraph,
    workers: usize,
    horizon: usize,
    options: SearchOptions,
    budget: SearchBudget,
}

impl<'g> MinimumCapacity<'g> {
    /// Prepares the query for a worker count and horizon.
    pub fn new(graph: &'g TaskGraph, workers: usize, horizon: usize) -> Self {
        Self {
            graph,
            workers,
            horizon,
            options: SearchOptions::default(),
            budget: SearchBudget::UNLIMITED,
        }
    }

    /// Replaces the default engine options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Caps the node and wall-clock spend across all trials.
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Bisects budgets over `[1, total cost]`.
    ///
    /// The total cost always suffices when any budget does: a single
    /// worker can then absorb every task on one day. Values above it
    /// change nothing, so the bisection never considers them.
    pub fn run(&self) -> Result<ScheduleResult> {
        self.graph.ensure_acyclic()?;
        if self.graph.is_empty() {
            return Ok(ScheduleResult::Optimal {
                value: 0,
                plan: Plan::new(self.workers, 0),
            });
        }

        let started = Instant::now();
        let mut nodes_left = self.budget.max_nodes;
        let total = self.graph.total_cost().min(u64::from(u32::MAX)) as u32;
        let (mut lo, mut hi) = (1u32, total);
        let mut best: Option<(u32, Plan)> = None;

        while lo <= hi {
            if deadline_passed(&self.budget, started) {
                return Ok(ScheduleResult::Timeout);
            }
            let mid = lo + (hi - lo) / 2;
            let params = TrialParams {
                workers: self.workers,
                daily_budget: mid,
                horizon: self.horizon,
            };
            let mut search = BacktrackSearch::new(self.graph, params)?
                .with_options(self.options)
                .with_budget(remaining_budget(&self.budget, nodes_left, started));
            match search.run() {
                Feasibility::Feasible(plan) => {
                    debug!(budget = mid, "feasible, tightening upper half");
                    best = Some((mid, plan));
                    hi = mid - 1;
                }
                Feasibility::Infeasible => {
                    debug!(budget = mid, "infeasible, raising lower half");
                    lo = mid + 1;
                }
                Feasibility::LimitReached => {
                    debug!(budget = mid, "search budget exhausted during bisection");
                    return Ok(ScheduleResult::Timeout);
                }
            }
            nodes_left = nodes_left.map(|n| n.saturating_sub(search.stats().nodes_expanded));
        }

        match best {
            Some((value, plan)) => {
                debug_assert!(validate_plan(
                    &plan,
                    self.graph,
                    value,
                    self.options.next_day_rule
                )
                .is_ok());
                Ok(ScheduleResult::Optimal {
                    value: u64::from(value),
                    plan,
                })
            }
            None => Ok(ScheduleResult::Unsat),
        }
    }
}

fn deadline_passed(budget: &SearchBudget, started: Instant) -> bool {
    budget
        .time_limit
        .is_some_and(|limit| started.elapsed() >= limit)
}

fn remaining_budget(
    budget: &SearchBudget,
    nodes_left: Option<u64>,
    started: Instant,
) -> SearchBudget {
    SearchBudget {
        max_nodes: nodes_left,
        time_limit: budget
            .time_limit
            .map(|limit| limit.saturating_sub(started.elapsed())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Task;
    use crate::search::{BestFirstOutcome, BestFirstSearch, Objective};

    /// A(2); B(2) and C(1) both depend on A.
    fn fork_graph() -> TaskGraph {
        TaskGraph::load([
            Task::new(1, 2),
            Task::new(2, 2).with_dep(1),
            Task::new(3, 1).with_dep(1),
        ])
        .unwrap()
    }

    fn cost_chain() -> TaskGraph {
        TaskGraph::load([
            Task::new(1, 2),
            Task::new(2, 2).with_dep(1),
            Task::new(3, 2).with_dep(2),
        ])
        .unwrap()
    }

    fn value_of(result: ScheduleResult) -> u64 {
        match result {
            ScheduleResult::Optimal { value, .. } => value,
            other => panic!("expected optimal, got {other:?}"),
        }
    }

    #[test]
    fn test_earliest_completion_fork() {
        for next_day in [false, true] {
            let graph = fork_graph();
            let query = EarliestCompletion::new(&graph, 1, 2)
                .with_options(SearchOptions::default().with_next_day_rule(next_day));
            let result = query.run(10).unwrap();
            assert_eq!(value_of(result), 3, "next_day={next_day}");
        }
    }

    #[test]
    fn test_earliest_completion_unsat_within_cap() {
        let graph = fork_graph();
        let result = EarliestCompletion::new(&graph, 1, 2).run(2).unwrap();
        assert_eq!(result, ScheduleResult::Unsat);
    }

    #[test]
    fn test_minimum_capacity_relaxes_with_horizon() {
        // Chain of three cost-2 tasks on one worker: three days fit one
        // task per day, two days force a doubled-up day.
        let graph = cost_chain();
        assert_eq!(value_of(MinimumCapacity::new(&graph, 1, 3).run().unwrap()), 2);
        assert_eq!(value_of(MinimumCapacity::new(&graph, 1, 2).run().unwrap()), 4);
    }

    #[test]
    fn test_minimum_capacity_unsat_when_no_budget_helps() {
        // Under the next-day rule a three-link chain needs three
        // distinct days; two can never hold it.
        let graph = cost_chain();
        let result = MinimumCapacity::new(&graph, 1, 2)
            .with_options(SearchOptions::default().with_next_day_rule(true))
            .run()
            .unwrap();
        assert_eq!(result, ScheduleResult::Unsat);
    }

    #[test]
    fn test_empty_problem_answers_zero() {
        let graph = TaskGraph::load([]).unwrap();
        let earliest = EarliestCompletion::new(&graph, 2, 3).run(5).unwrap();
        assert_eq!(value_of(earliest), 0);
        let capacity = MinimumCapacity::new(&graph, 2, 5).run().unwrap();
        assert_eq!(value_of(capacity), 0);
    }

    #[test]
    fn test_cyclic_problem_is_an_error() {
        let graph =
            TaskGraph::load([Task::new(1, 1).with_dep(2), Task::new(2, 1).with_dep(1)]).unwrap();
        let err = EarliestCompletion::new(&graph, 1, 1).run(3).unwrap_err();
        assert!(matches!(err, Error::CyclicDependency(_)));
        let err = MinimumCapacity::new(&graph, 1, 3).run().unwrap_err();
        assert!(matches!(err, Error::CyclicDependency(_)));
    }

    #[test]
    fn test_node_budget_breach_is_timeout() {
        let graph = fork_graph();
        let result = EarliestCompletion::new(&graph, 1, 2)
            .with_budget(SearchBudget::default().with_max_nodes(1))
            .run(10)
            .unwrap();
        assert_eq!(result, ScheduleResult::Timeout);

        let result = MinimumCapacity::new(&graph, 1, 3)
            .with_budget(SearchBudget::default().with_max_nodes(1))
            .run()
            .unwrap();
        assert_eq!(result, ScheduleResult::Timeout);
    }

    #[test]
    fn test_feasibility_is_monotone_beyond_the_minimum() {
        let graph = fork_graph();
        let earliest = value_of(EarliestCompletion::new(&graph, 1, 2).run(10).unwrap());
        for extra in 0..2 {
            let params = TrialParams {
                workers: 1,
                daily_budget: 2,
                horizon: earliest as usize + extra,
            };
            let mut trial = BacktrackSearch::new(&graph, params).unwrap();
            assert!(trial.run().is_feasible(), "horizon={}", params.horizon);
        }
    }

    #[test]
    fn test_feasibility_is_monotone_in_budget() {
        // Fixed three-day horizon for the fork: infeasible below the
        // bisection minimum, feasible at it and at every larger budget.
        // The capacity query's binary search rests on this shape.
        let graph = fork_graph();
        let minimum = value_of(MinimumCapacity::new(&graph, 1, 3).run().unwrap());
        assert_eq!(minimum, 2);

        for daily_budget in 1..=5u32 {
            let params = TrialParams {
                workers: 1,
                daily_budget,
                horizon: 3,
            };
            let mut trial = BacktrackSearch::new(&graph, params).unwrap();
            assert_eq!(
                trial.run().is_feasible(),
                u64::from(daily_budget) >= minimum,
                "daily_budget={daily_budget}"
            );
        }
    }

    #[test]
    fn test_sweep_agrees_with_best_first_under_next_day_rule() {
        for graph in [fork_graph(), cost_chain()] {
            let sweep = EarliestCompletion::new(&graph, 1, 2)
                .with_options(SearchOptions::default().with_next_day_rule(true))
                .run(10)
                .unwrap();
            let mut astar = BestFirstSearch::new(&graph, 1, 2, Objective::MinimizeDays)
                .unwrap()
                .with_next_day_rule(true);
            match (sweep, astar.run()) {
                (
                    ScheduleResult::Optimal { value: a, .. },
                    BestFirstOutcome::Optimal { value: b, .. },
                ) => assert_eq!(a, b),
                (s, b) => panic!("expected two optima, got {s:?} and {b:?}"),
            }
        }
    }

    #[test]
    fn test_queries_are_idempotent() {
        let graph = fork_graph();
        let query = EarliestCompletion::new(&graph, 2, 2);
        assert_eq!(query.run(6).unwrap(), query.run(6).unwrap());

        let query = MinimumCapacity::new(&graph, 2, 2);
        assert_eq!(query.run().unwrap(), query.run().unwrap());
    }
}
