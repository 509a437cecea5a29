//! Admissible lower bounds for best-first search.
//!
//! A heuristic must never overestimate the objective still to be paid
//! from a packing state; that is what lets the best-first engine accept
//! the first goal it pops as the optimum.
//!
//! # Reference
//! Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", §3.5-3.6

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::models::{TaskGraph, TaskId};

/// Snapshot of a packing state, as seen by a heuristic.
#[derive(Debug)]
pub struct HeuristicContext<'a> {
    /// The problem being solved.
    pub graph: &'a TaskGraph,
    /// Tasks already placed.
    pub completed: &'a BTreeSet<TaskId>,
    /// Budget left with each worker on the current day.
    pub residual_today: &'a [u32],
    /// Budget each worker starts a fresh day with.
    pub daily_budget: u32,
}

/// An admissible estimate of the remaining objective.
pub trait Heuristic: Debug + Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Lower bound on the objective still to be paid from this state.
    /// `u64::MAX` means no completion is reachable with these
    /// parameters.
    fn lower_bound(&self, ctx: &HeuristicContext<'_>) -> u64;
}

/// Capacity-relaxation bound on the number of fresh days still needed.
///
/// Precedence is ignored entirely. With `r` tasks left and a cheapest
/// remaining cost `c_min`, a fresh day absorbs at most
/// `workers * floor(daily_budget / c_min)` tasks and today's leftover
/// cells absorb `sum_w floor(residual_w / c_min)` more. Days already
/// opened are paid by the path cost, so only fresh days are counted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemainingDays;

impl Heuristic for RemainingDays {
    fn name(&self) -> &'static str {
        "remaining-days"
    }

    fn lower_bound(&self, ctx: &HeuristicContext<'_>) -> u64 {
        let mut remaining = 0u64;
        let mut min_cost = u32::MAX;
        let mut max_cost = 0u32;
        for task in ctx.graph.tasks() {
            if ctx.completed.contains(&task.id) {
                continue;
            }
            remaining += 1;
            min_cost = min_cost.min(task.cost);
            max_cost = max_cost.max(task.cost);
        }
        if remaining == 0 {
            return 0;
        }
        if max_cost > ctx.daily_budget {
            return u64::MAX;
        }

        let workers = ctx.residual_today.len() as u64;
        let per_day = workers * u64::from(ctx.daily_budget / min_cost);
        let fits_today: u64 = ctx
            .residual_today
            .iter()
            .map(|&r| u64::from(r / min_cost))
            .sum();
        let fits_today = fits_today.min(remaining);
        (remaining - fits_today).div_ceil(per_day)
    }
}

/// Exact remaining effort for the minimize-total-cost objective: every
/// remaining task pays its cost exactly once, wherever it lands.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemainingCost;

impl Heuristic for RemainingCost {
    fn name(&self) -> &'static str {
        "remaining-cost"
    }

    fn lower_bound(&self, ctx: &HeuristicContext<'_>) -> u64 {
        let mut total = 0u64;
        for task in ctx.graph.tasks() {
            if ctx.completed.contains(&task.id) {
                continue;
            }
            if task.cost > ctx.daily_budget {
                return u64::MAX;
            }
            total += u64::from(task.cost);
        }
        total
    }
}
