//! Scheduling domain models.
//!
//! Core data types for precedence-constrained day scheduling: tasks with
//! integer costs and dependencies, the validated dependency graph, and
//! the plans a search produces.
//!
//! # Conventions
//!
//! | quantity | representation |
//! |----------|----------------|
//! | task id  | positive integer, `0` reserved by the input grammar |
//! | worker   | 1-based in records and output |
//! | day      | 0-based internally, printed 1-based |
//! | cost     | budget units, at least 1 |

mod graph;
mod plan;
mod task;

pub use graph::TaskGraph;
pub use plan::{Assignment, Plan};
pub use task::{Task, TaskId};
