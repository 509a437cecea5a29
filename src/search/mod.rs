//! Search engines over the worker/day grid.
//!
//! Two engines share the same placement model:
//!
//! * [`BacktrackSearch`] commits tasks to slots depth first with undo,
//!   either stopping at the first complete schedule or enumerating all
//!   of them.
//! * [`BestFirstSearch`] packs days forward in time and pops states by
//!   admissible lower bound, returning an optimal objective value.
//!
//! Both respect a [`SearchBudget`]; exhausting it surfaces as a
//! distinguished outcome, never as a silently wrong answer.

mod astar;
mod backtrack;
mod heuristic;
mod memo;
mod state;

pub use astar::{BestFirstOutcome, BestFirstSearch};
pub use backtrack::BacktrackSearch;
pub use heuristic::{Heuristic, HeuristicContext, RemainingCost, RemainingDays};
pub use memo::Memoizer;
pub use state::{Commitment, ScheduleState};

use std::time::{Duration, Instant};

use crate::models::Plan;

/// Plans an enumeration keeps before the cap cuts off collection.
pub const DEFAULT_REPORT_CAP: usize = 5;

/// Grid sizing for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialParams {
    /// Number of workers (N), at least 1.
    pub workers: usize,
    /// Budget units per worker per day (K), at least 1.
    pub daily_budget: u32,
    /// Number of days available (h).
    pub horizon: usize,
}

/// Behavioral switches shared by the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// A task may not run on the same day as any of its dependencies.
    pub next_day_rule: bool,
    /// Prune revisited states (backtracking engine).
    pub dedup: bool,
    /// Fold worker-permuted states together when deduping.
    pub canonical_workers: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            next_day_rule: false,
            dedup: true,
            canonical_workers: false,
        }
    }
}

impl SearchOptions {
    /// Enables or disables the next-day dependency rule.
    pub fn with_next_day_rule(mut self, on: bool) -> Self {
        self.next_day_rule = on;
        self
    }

    /// Enables or disables visited-state pruning.
    pub fn with_dedup(mut self, on: bool) -> Self {
        self.dedup = on;
        self
    }

    /// Enables or disables worker-symmetry folding during dedup.
    pub fn with_canonical_workers(mut self, on: bool) -> Self {
        self.canonical_workers = on;
        self
    }
}

/// Resource limits on a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    /// Maximum node expansions; `None` is unlimited.
    pub max_nodes: Option<u64>,
    /// Wall-clock limit; `None` is unlimited.
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    /// No limits at all.
    pub const UNLIMITED: Self = Self {
        max_nodes: None,
        time_limit: None,
    };

    /// Caps node expansions.
    pub fn with_max_nodes(mut self, n: u64) -> Self {
        self.max_nodes = Some(n);
        self
    }

    /// Caps wall-clock time.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Meters node and wall-clock spend against a [`SearchBudget`].
///
/// Once exhausted it stays exhausted, so a breach noticed mid-search
/// cannot be un-noticed by later charges.
#[derive(Debug)]
pub struct BudgetMeter {
    budget: SearchBudget,
    nodes: u64,
    started: Instant,
    exhausted: bool,
}

impl BudgetMeter {
    /// Starts metering now.
    pub fn new(budget: SearchBudget) -> Self {
        Self {
            budget,
            nodes: 0,
            started: Instant::now(),
            exhausted: false,
        }
    }

    /// Charges one node expansion. Returns `false` once the budget is
    /// exhausted.
    pub fn charge(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        self.nodes += 1;
        if let Some(cap) = self.budget.max_nodes {
            if self.nodes > cap {
                self.exhausted = true;
            }
        }
        if let Some(limit) = self.budget.time_limit {
            // Clock reads are batched; an expansion is far cheaper than
            // a syscall.
            if self.nodes % 1024 == 0 && self.started.elapsed() >= limit {
                self.exhausted = true;
            }
        }
        !self.exhausted
    }

    /// Nodes charged so far, including the charge that tripped the limit.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Whether a limit has been hit.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Counters reported by an engine after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States expanded: recursion entries or frontier pops.
    pub nodes_expanded: u64,
    /// States skipped because an equivalent one was already explored.
    pub states_pruned: u64,
    /// Complete schedules encountered.
    pub solutions_found: u64,
    /// Largest frontier size reached (best-first engine).
    pub peak_frontier: usize,
}

/// Outcome of a fixed-parameter feasibility search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feasibility {
    /// A complete schedule exists; here is one.
    Feasible(Plan),
    /// The space was exhausted without finding a complete schedule.
    Infeasible,
    /// The search budget ran out before a verdict.
    LimitReached,
}

impl Feasibility {
    /// Whether a witness plan was found.
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible(_))
    }
}

/// What a best-first run optimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Fewest days with any scheduled work.
    MinimizeDays,
    /// Least total effort paid across all placements.
    MinimizeCost,
}

impl Objective {
    /// The admissible bound matching this objective.
    pub fn heuristic(self) -> Box<dyn Heuristic> {
        match self {
            Self::MinimizeDays => Box::new(RemainingDays),
            Self::MinimizeCost => Box::new(RemainingCost),
        }
    }
}

/// How the backtracking engine terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktrackMode {
    /// Stop at the first complete schedule.
    FirstFeasible,
    /// Visit every complete schedule, keeping at most `report_cap`
    /// plans for reporting.
    EnumerateAll { report_cap: usize },
}

impl BacktrackMode {
    /// Enumeration keeping [`DEFAULT_REPORT_CAP`] plans.
    pub fn enumerate() -> Self {
        Self::EnumerateAll {
            report_cap: DEFAULT_REPORT_CAP,
        }
    }
}
