//! Depth-first backtracking over task placements.
//!
//! The engine always works on the lexicographically first ready task and
//! tries each slot for it in day-major order. A committed placement goes
//! on the state trail; once its subtree is explored the commitment is
//! popped and the next slot tried. Because the target task is a pure
//! function of the completed set, two complete schedules differ only in
//! slot choices and the walk visits every schedule exactly once.
//!
//! Deferring a task needs no explicit move: placing it on a later day
//! covers every deferral, and days nobody works on simply stay at full
//! budget.
//!
//! # Reference
//! Brucker (2007), "Scheduling Algorithms", Ch. 2 (branching schemes)
//! Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", §6.3

use tracing::{debug, trace};

use super::memo::Memoizer;
use super::state::ScheduleState;
use super::{
    BacktrackMode, BudgetMeter, Feasibility, SearchBudget, SearchOptions, SearchStats, TrialParams,
};
use crate::error::{Error, Result};
use crate::models::{Plan, TaskGraph};

/// Control signal threaded through the recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Keep exploring siblings.
    Continue,
    /// A first-feasible goal was reached; unwind.
    Stop,
    /// The budget ran out; unwind.
    Abort,
}

/// Depth-first engine for one fixed-parameter trial.
///
/// The engine is single-shot: build it, configure it, call
/// [`BacktrackSearch::run`] once, then read plans and stats.
#[derive(Debug)]
pub struct BacktrackSearch<'g> {
    graph: &'g TaskGraph,
    params: TrialParams,
    options: SearchOptions,
    mode: BacktrackMode,
    budget: SearchBudget,
    state: ScheduleState,
    memo: Memoizer,
    stats: SearchStats,
    plans: Vec<Plan>,
}

impl<'g> BacktrackSearch<'g> {
    /// Prepares a trial over `graph` with the given grid sizing.
    ///
    /// Fails on a cyclic dependency relation or a zero worker count
    /// rather than searching parameters no schedule can satisfy.
    pub fn new(graph: &'g TaskGraph, params: TrialParams) -> Result<Self> {
        if params.workers == 0 {
            return Err(Error::MalformedInput(
                "worker count must be at least 1".into(),
            ));
        }
        graph.ensure_acyclic()?;
        let options = SearchOptions::default();
        Ok(Self {
            graph,
            params,
            memo: Self::memoizer_for(&options),
            options,
            mode: BacktrackMode::FirstFeasible,
            budget: SearchBudget::UNLIMITED,
            state: ScheduleState::new(params.workers, params.horizon, params.daily_budget),
            stats: SearchStats::default(),
            plans: Vec::new(),
        })
    }

    /// Replaces the default options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.memo = Self::memoizer_for(&options);
        self.options = options;
        self
    }

    /// Selects the termination mode.
    pub fn with_mode(mut self, mode: BacktrackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Caps the node and wall-clock spend.
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    fn memoizer_for(options: &SearchOptions) -> Memoizer {
        // Under the next-day rule, equal grids with different completion
        // days are not interchangeable; the key is widened to stay sound.
        Memoizer::new()
            .with_worker_canonicalization(options.canonical_workers)
            .with_completion_days(options.next_day_rule)
    }

    /// Runs the search to its first goal, exhaustion, or budget limit.
    ///
    /// Whatever the outcome, every commitment is unwound before
    /// returning, leaving the budget grid pristine.
    pub fn run(&mut self) -> Feasibility {
        let mut meter = BudgetMeter::new(self.budget);
        let flow = self.search(&mut meter);
        debug_assert!(self.state.is_pristine());
        debug!(
            nodes = self.stats.nodes_expanded,
            pruned = self.stats.states_pruned,
            solutions = self.stats.solutions_found,
            horizon = self.params.horizon,
            "backtracking finished"
        );
        match flow {
            Flow::Abort => Feasibility::LimitReached,
            Flow::Stop | Flow::Continue => match self.plans.first() {
                Some(first) => Feasibility::Feasible(first.clone()),
                None => Feasibility::Infeasible,
            },
        }
    }

    /// Plans recorded so far: the single witness in first-feasible mode,
    /// up to the report cap when enumerating.
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Complete schedules encountered. In enumerate mode with dedup
    /// enabled this counts one representative per equivalence class of
    /// states, which undercounts raw placements.
    pub fn solutions_found(&self) -> u64 {
        self.stats.solutions_found
    }

    /// Counters accumulated by the run.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn search(&mut self, meter: &mut BudgetMeter) -> Flow {
        if self.state.completed_count() == self.graph.len() {
            return self.record_goal();
        }
        if !meter.charge() {
            return Flow::Abort;
        }
        self.stats.nodes_expanded += 1;
        if self.options.dedup && self.memo.check_and_record(&self.state) {
            self.stats.states_pruned += 1;
            return Flow::Continue;
        }

        let graph = self.graph;
        let ready = graph.ready_tasks(self.state.completed());
        let Some(&target) = ready.first() else {
            return Flow::Continue;
        };

        for day in 0..self.params.horizon {
            if !self
                .state
                .placeable_on(target, day, self.options.next_day_rule)
            {
                continue;
            }
            for worker in 0..self.params.workers {
                if !self.state.commit(target.id, worker, day, target.cost) {
                    continue;
                }
                trace!(task = %target.id, worker, day, "commit");
                let flow = self.search(meter);
                self.state.uncommit();
                if flow != Flow::Continue {
                    return flow;
                }
            }
        }
        Flow::Continue
    }

    fn record_goal(&mut self) -> Flow {
        self.stats.solutions_found += 1;
        let cap = match self.mode {
            BacktrackMode::FirstFeasible => 1,
            // A witness is always kept, even with a zero report cap.
            BacktrackMode::EnumerateAll { report_cap } => report_cap.max(1),
        };
        if self.plans.len() < cap {
            self.plans.push(self.state.snapshot_plan());
        }
        match self.mode {
            BacktrackMode::FirstFeasible => Flow::Stop,
            BacktrackMode::EnumerateAll { .. } => Flow::Continue,
        }
    }
}
