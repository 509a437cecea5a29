//! Best-first search over day-forward packings.
//!
//! States advance through days monotonically: the engine either places a
//! ready task with a worker who still has budget today, or closes a
//! nonempty day and opens the next. Past days are never touched again,
//! so a state is fully described by its completed set, current day,
//! today's residual budgets, and today's completions.
//!
//! With an admissible heuristic the first goal popped is the optimum.
//! The bounds used here are not consistent across zero-cost day
//! advances, so a better path to a known state re-opens it instead of
//! being discarded.
//!
//! # Reference
//! Hart, Nilsson & Raphael (1968), "A Formal Basis for the Heuristic
//! Determination of Minimum Cost Paths"
//! Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", §3.5

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use tracing::debug;

use super::heuristic::HeuristicContext;
use super::{BudgetMeter, Heuristic, Objective, SearchBudget, SearchStats};
use crate::error::{Error, Result};
use crate::models::{Assignment, Plan, TaskGraph, TaskId};

/// Outcome of a best-first run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestFirstOutcome {
    /// The optimum objective value, with a witness plan.
    Optimal { value: u64, plan: Plan },
    /// No complete schedule exists under the given parameters.
    Infeasible,
    /// The search budget ran out before the optimum was proven.
    LimitReached,
}

/// Heap entries order by (f, h, insertion order, arena index); the
/// insertion order makes tie handling deterministic.
type Frontier = BinaryHeap<Reverse<(u64, u64, u64, usize)>>;

/// Packing state kept in the node arena.
#[derive(Debug, Clone)]
struct Node {
    completed: BTreeSet<TaskId>,
    /// Tasks completed on the current day.
    today: BTreeSet<TaskId>,
    /// Remaining budget per worker on the current day.
    residual: Vec<u32>,
    day: usize,
    g: u64,
    parent: Option<usize>,
    /// The placement that produced this node; `None` for the root and
    /// for day advances.
    step: Option<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NodeKey {
    completed: Vec<TaskId>,
    day: usize,
    residual: Vec<u32>,
    /// Populated only under the next-day rule, where today's
    /// completions decide which placements are still legal.
    today: Vec<TaskId>,
}

/// Best-first engine for one set of parameters.
///
/// Single-shot, like its backtracking sibling: build, configure, call
/// [`BestFirstSearch::run`] once, read the stats.
#[derive(Debug)]
pub struct BestFirstSearch<'g> {
    graph: &'g TaskGraph,
    workers: usize,
    daily_budget: u32,
    horizon: Option<usize>,
    objective: Objective,
    heuristic: Box<dyn Heuristic>,
    next_day_rule: bool,
    budget: SearchBudget,
    stats: SearchStats,
}

impl<'g> BestFirstSearch<'g> {
    /// Prepares a search with the heuristic matching the objective.
    ///
    /// Fails on a cyclic dependency relation or a zero worker count
    /// rather than searching parameters no schedule can satisfy.
    pub fn new(
        graph: &'g TaskGraph,
        workers: usize,
        daily_budget: u32,
        objective: Objective,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(Error::MalformedInput(
                "worker count must be at least 1".into(),
            ));
        }
        graph.ensure_acyclic()?;
        Ok(Self {
            graph,
            workers,
            daily_budget,
            horizon: None,
            heuristic: objective.heuristic(),
            objective,
            next_day_rule: false,
            budget: SearchBudget::UNLIMITED,
            stats: SearchStats::default(),
        })
    }

    /// Bounds the packing to the first `horizon` days.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Forbids running a task on the same day as any of its dependencies.
    pub fn with_next_day_rule(mut self, on: bool) -> Self {
        self.next_day_rule = on;
        self
    }

    /// Caps the node and wall-clock spend.
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Swaps in a custom bound. It must stay admissible for the chosen
    /// objective or the first goal popped may not be optimal.
    pub fn with_heuristic(mut self, heuristic: Box<dyn Heuristic>) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Counters accumulated by the run.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Runs the search to the proven optimum, exhaustion, or the budget
    /// limit.
    pub fn run(&mut self) -> BestFirstOutcome {
        let mut meter = BudgetMeter::new(self.budget);
        let mut arena: Vec<Node> = Vec::new();
        let mut frontier: Frontier = BinaryHeap::new();
        let mut best_g: HashMap<NodeKey, u64> = HashMap::new();
        let mut order = 0u64;

        let root = Node {
            completed: BTreeSet::new(),
            today: BTreeSet::new(),
            residual: vec![self.daily_budget; self.workers],
            day: 0,
            g: 0,
            parent: None,
            step: None,
        };
        let h0 = self.estimate(&root);
        if h0 == u64::MAX && !self.graph.is_empty() {
            debug!(heuristic = self.heuristic.name(), "goal unreachable from root");
            return BestFirstOutcome::Infeasible;
        }
        best_g.insert(self.key_of(&root), 0);
        arena.push(root);
        frontier.push(Reverse((h0, h0, order, 0)));
        order += 1;
        self.stats.peak_frontier = 1;

        while let Some(Reverse((_f, _h, _order, idx))) = frontier.pop() {
            let node = arena[idx].clone();
            if node.completed.len() == self.graph.len() {
                self.stats.solutions_found = 1;
                let plan = self.reconstruct(&arena, idx);
                debug!(
                    value = node.g,
                    nodes = self.stats.nodes_expanded,
                    pruned = self.stats.states_pruned,
                    heuristic = self.heuristic.name(),
                    "best-first optimum proven"
                );
                return BestFirstOutcome::Optimal {
                    value: node.g,
                    plan,
                };
            }
            // Stale entry: a cheaper path to this state was found after
            // this one was queued.
            if best_g
                .get(&self.key_of(&node))
                .is_some_and(|&g| g < node.g)
            {
                self.stats.states_pruned += 1;
                continue;
            }
            if !meter.charge() {
                debug!(nodes = self.stats.nodes_expanded, "best-first budget exhausted");
                return BestFirstOutcome::LimitReached;
            }
            self.stats.nodes_expanded += 1;

            if self.day_open(node.day) {
                let graph = self.graph;
                for task in graph.tasks() {
                    if node.completed.contains(&task.id) {
                        continue;
                    }
                    if !task.deps.iter().all(|d| node.completed.contains(d)) {
                        continue;
                    }
                    if self.next_day_rule && task.deps.iter().any(|d| node.today.contains(d)) {
                        continue;
                    }
                    for worker in 0..self.workers {
                        if node.residual[worker] < task.cost {
                            continue;
                        }
                        let mut completed = node.completed.clone();
                        completed.insert(task.id);
                        let mut today = node.today.clone();
                        today.insert(task.id);
                        let mut residual = node.residual.clone();
                        residual[worker] -= task.cost;
                        let g = match self.objective {
                            Objective::MinimizeDays => {
                                node.g + u64::from(node.today.is_empty())
                            }
                            Objective::MinimizeCost => node.g + u64::from(task.cost),
                        };
                        let child = Node {
                            completed,
                            today,
                            residual,
                            day: node.day,
                            g,
                            parent: Some(idx),
                            step: Some(Assignment {
                                task: task.id,
                                worker: worker + 1,
                                day: node.day,
                            }),
                        };
                        self.consider(child, &mut arena, &mut frontier, &mut best_g, &mut order);
                    }
                }
            }

            // Closing an empty day would buy nothing, so advances only
            // happen once today has work on it.
            if !node.today.is_empty() && self.day_open(node.day + 1) {
                let child = Node {
                    completed: node.completed.clone(),
                    today: BTreeSet::new(),
                    residual: vec![self.daily_budget; self.workers],
                    day: node.day + 1,
                    g: node.g,
                    parent: Some(idx),
                    step: None,
                };
                self.consider(child, &mut arena, &mut frontier, &mut best_g, &mut order);
            }
        }

        debug!(
            nodes = self.stats.nodes_expanded,
            pruned = self.stats.states_pruned,
            "best-first space exhausted"
        );
        BestFirstOutcome::Infeasible
    }

    fn consider(
        &mut self,
        child: Node,
        arena: &mut Vec<Node>,
        frontier: &mut Frontier,
        best_g: &mut HashMap<NodeKey, u64>,
        order: &mut u64,
    ) {
        let key = self.key_of(&child);
        if best_g.get(&key).is_some_and(|&g| g <= child.g) {
            self.stats.states_pruned += 1;
            return;
        }
        let h = self.estimate(&child);
        if h == u64::MAX {
            self.stats.states_pruned += 1;
            return;
        }
        best_g.insert(key, child.g);
        let f = child.g.saturating_add(h);
        let idx = arena.len();
        arena.push(child);
        frontier.push(Reverse((f, h, *order, idx)));
        *order += 1;
        self.stats.peak_frontier = self.stats.peak_frontier.max(frontier.len());
    }

    fn day_open(&self, day: usize) -> bool {
        self.horizon.map_or(true, |h| day < h)
    }

    fn key_of(&self, node: &Node) -> NodeKey {
        NodeKey {
            completed: node.completed.iter().copied().collect(),
            day: node.day,
            residual: node.residual.clone(),
            today: if self.next_day_rule {
                node.today.iter().copied().collect()
            } else {
                Vec::new()
            },
        }
    }

    fn estimate(&self, node: &Node) -> u64 {
        let ctx = HeuristicContext {
            graph: self.graph,
            completed: &node.completed,
            residual_today: &node.residual,
            daily_budget: self.daily_budget,
        };
        self.heuristic.lower_bound(&ctx)
    }

    fn reconstruct(&self, arena: &[Node], goal: usize) -> Plan {
        let horizon = if arena[goal].completed.is_empty() {
            0
        } else {
            arena[goal].day + 1
        };
        let mut steps = Vec::new();
        let mut idx = goal;
        loop {
            let node = &arena[idx];
            if let Some(step) = node.step {
                steps.push(step);
            }
            match node.parent {
                Some(parent) => idx = parent,
                None => break,
            }
        }
        steps.reverse();
        let mut plan = Plan::new(self.workers, horizon);
        for step in steps {
            plan.push(step);
        }
        plan
    }
}
