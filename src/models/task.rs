//! Task model.
//!
//! A task is an indivisible unit of work: exactly one worker performs it
//! within a single day, spending `cost` units of that worker's daily
//! budget. Tasks may depend on other tasks; the dependency relation over
//! a whole problem must form a DAG.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 2

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a task.
///
/// Identifiers are positive integers; `0` is reserved as the dependency
/// list terminator in the input grammar and never names a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u32);

impl TaskId {
    /// Creates a task identifier from its numeric value.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaskId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A task to be placed on the worker/day grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Effort in budget units, deducted from one worker's budget on the
    /// day the task runs. Always at least 1.
    pub cost: u32,
    /// Tasks that must be completed before this one may run.
    pub deps: BTreeSet<TaskId>,
}

impl Task {
    /// Creates a new task with the given identifier and cost.
    pub fn new(id: impl Into<TaskId>, cost: u32) -> Self {
        Self {
            id: id.into(),
            cost,
            deps: BTreeSet::new(),
        }
    }

    /// Adds a single dependency.
    pub fn with_dep(mut self, dep: impl Into<TaskId>) -> Self {
        self.deps.insert(dep.into());
        self
    }

    /// Adds several dependencies at once.
    pub fn with_deps<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.deps.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Whether this task depends on `other`.
    pub fn depends_on(&self, other: TaskId) -> bool {
        self.deps.contains(&other)
    }

    /// Whether this task has no dependencies.
    pub fn is_root(&self) -> bool {
        self.deps.is_empty()
    }
}
