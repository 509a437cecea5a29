//! Dependency graph over tasks.
//!
//! `TaskGraph` owns the task set, validates referential integrity at load
//! time, and answers the two questions the search engines ask: does the
//! dependency relation contain a cycle, and which tasks are ready given
//! the set of completed ones.
//!
//! Cycle detection runs a Kahn elimination pass rather than a recursive
//! DFS, so arbitrarily deep graphs cannot overflow the stack and the
//! leftover nodes double as the diagnostic.
//!
//! # Reference
//! Kahn (1962), "Topological sorting of large networks", CACM 5(11)
//! Cormen et al. (2009), "Introduction to Algorithms", §22.4

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::{Task, TaskId};
use crate::error::{Error, Result};

/// An immutable, validated set of tasks with their dependency relation.
///
/// Tasks are kept in ascending id order, which makes every derived
/// iteration (ready sets, remaining-work scans) deterministic.
#[derive(Debug, Clone, Serialize)]
pub struct TaskGraph {
    tasks: BTreeMap<TaskId, Task>,
}

impl TaskGraph {
    /// Builds a graph from task records.
    ///
    /// Fails with [`Error::MalformedInput`] when an id appears twice, a
    /// cost is zero, a task lists itself as a dependency, or a
    /// dependency names a task that does not exist. Cycles are not
    /// checked here; call [`TaskGraph::ensure_acyclic`] before
    /// searching.
    pub fn load(records: impl IntoIterator<Item = Task>) -> Result<Self> {
        let mut tasks = BTreeMap::new();
        for task in records {
            if task.cost == 0 {
                return Err(Error::MalformedInput(format!(
                    "task {} has zero cost",
                    task.id
                )));
            }
            if task.depends_on(task.id) {
                return Err(Error::MalformedInput(format!(
                    "task {} lists itself as a dependency",
                    task.id
                )));
            }
            let id = task.id;
            if tasks.insert(id, task).is_some() {
                return Err(Error::MalformedInput(format!("duplicate task id {id}")));
            }
        }
        let graph = Self { tasks };
        for task in graph.tasks.values() {
            for dep in &task.deps {
                if !graph.tasks.contains_key(dep) {
                    return Err(Error::MalformedInput(format!(
                        "task {} depends on unknown task {}",
                        task.id, dep
                    )));
                }
            }
        }
        Ok(graph)
    }

    /// Whether the dependency relation contains a cycle.
    pub fn has_cycle(&self) -> bool {
        !self.cycle_members().is_empty()
    }

    /// Tasks left with unresolved dependencies after a Kahn elimination
    /// pass, in ascending id order. Empty exactly when the graph is
    /// acyclic.
    pub fn cycle_members(&self) -> Vec<TaskId> {
        let mut indegree: BTreeMap<TaskId, usize> = self
            .tasks
            .values()
            .map(|t| (t.id, t.deps.len()))
            .collect();
        let mut dependents: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();
        for task in self.tasks.values() {
            for &dep in &task.deps {
                dependents.entry(dep).or_default().push(task.id);
            }
        }

        let mut queue: VecDeque<TaskId> = indegree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();
        while let Some(id) = queue.pop_front() {
            let Some(targets) = dependents.get(&id) else {
                continue;
            };
            for &dependent in targets {
                if let Some(deg) = indegree.get_mut(&dependent) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        indegree
            .into_iter()
            .filter(|&(_, deg)| deg > 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// Fails with [`Error::CyclicDependency`] naming the tasks stuck in a
    /// cycle (or downstream of one), if any.
    pub fn ensure_acyclic(&self) -> Result<()> {
        let members = self.cycle_members();
        if members.is_empty() {
            return Ok(());
        }
        let list = members
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Err(Error::CyclicDependency(list))
    }

    /// Tasks that are not yet completed and whose dependencies all appear
    /// in `completed`, in ascending id order.
    ///
    /// Readiness is purely set-based; when a placement must additionally
    /// respect completion days, the engine applies that check on top.
    pub fn ready_tasks(&self, completed: &BTreeSet<TaskId>) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|t| !completed.contains(&t.id))
            .filter(|t| t.deps.iter().all(|d| completed.contains(d)))
            .collect()
    }

    /// Looks up a task by id.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Iterates all tasks in ascending id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Sum of all task costs.
    pub fn total_cost(&self) -> u64 {
        self.tasks.values().map(|t| u64::from(t.cost)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> TaskGraph {
        // 1 -> {2, 3} -> 4
        TaskGraph::load([
            Task::new(1, 2),
            Task::new(2, 1).with_dep(1),
            Task::new(3, 1).with_dep(1),
            Task::new(4, 3).with_deps([2, 3]),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_and_lookup() {
        let graph = diamond();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.task(TaskId::new(4)).unwrap().cost, 3);
        assert!(graph.task(TaskId::new(9)).is_none());
        assert_eq!(graph.total_cost(), 7);

        let ids: Vec<TaskId> = graph.tasks().map(|t| t.id).collect();
        assert_eq!(ids, vec![1.into(), 2.into(), 3.into(), 4.into()]);
    }

    #[test]
    fn test_load_rejects_duplicate_id() {
        let err = TaskGraph::load([Task::new(1, 1), Task::new(1, 2)]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_load_rejects_unknown_dependency() {
        let err = TaskGraph::load([Task::new(1, 1).with_dep(7)]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert!(err.to_string().contains("unknown task 7"));
    }

    #[test]
    fn test_load_rejects_self_dependency() {
        let err = TaskGraph::load([Task::new(1, 1).with_dep(1)]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_load_rejects_zero_cost() {
        // Search bounds divide by task costs; zero never loads.
        let err = TaskGraph::load([Task::new(1, 0)]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert!(err.to_string().contains("zero cost"));
    }

    #[test]
    fn test_acyclic_graphs_pass() {
        assert!(!diamond().has_cycle());
        diamond().ensure_acyclic().unwrap();

        let chain = TaskGraph::load([
            Task::new(1, 1),
            Task::new(2, 1).with_dep(1),
            Task::new(3, 1).with_dep(2),
        ])
        .unwrap();
        assert!(!chain.has_cycle());
    }

    #[test]
    fn test_cycle_detected_and_reported() {
        let graph = TaskGraph::load([
            Task::new(1, 1),
            Task::new(2, 1).with_deps([1, 4]),
            Task::new(3, 1).with_dep(2),
            Task::new(4, 1).with_dep(3),
        ])
        .unwrap();

        assert!(graph.has_cycle());
        assert_eq!(
            graph.cycle_members(),
            vec![TaskId::new(2), TaskId::new(3), TaskId::new(4)]
        );
        let err = graph.ensure_acyclic().unwrap_err();
        assert!(matches!(err, Error::CyclicDependency(_)));
        assert!(err.to_string().contains("2, 3, 4"));
    }

    fn ready_ids(graph: &TaskGraph, completed: &BTreeSet<TaskId>) -> Vec<TaskId> {
        graph.ready_tasks(completed).iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_ready_tasks_follow_completed_set() {
        let graph = diamond();

        let none = BTreeSet::new();
        assert_eq!(ready_ids(&graph, &none), vec![TaskId::new(1)]);

        let one: BTreeSet<TaskId> = [TaskId::new(1)].into();
        assert_eq!(
            ready_ids(&graph, &one),
            vec![TaskId::new(2), TaskId::new(3)]
        );

        let three: BTreeSet<TaskId> = [1, 2, 3].map(TaskId::new).into();
        assert_eq!(ready_ids(&graph, &three), vec![TaskId::new(4)]);

        let all: BTreeSet<TaskId> = [1, 2, 3, 4].map(TaskId::new).into();
        assert!(graph.ready_tasks(&all).is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let graph = TaskGraph::load([]).unwrap();
        assert!(graph.is_empty());
        assert!(!graph.has_cycle());
        assert_eq!(graph.total_cost(), 0);
    }
}
