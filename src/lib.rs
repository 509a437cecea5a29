//! Precedence-constrained day scheduling.
//!
//! Tasks with integer costs and dependency sets are placed on a grid of
//! workers and days, each worker holding a fixed budget of units per
//! day. On top of fixed-parameter feasibility searches the crate
//! answers two query shapes: the earliest completion horizon and the
//! minimum daily budget for a fixed horizon.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Task`, `TaskId`, `TaskGraph`, `Plan`,
//!   `Assignment`
//! - **`input`**: The line-oriented problem grammar (`N`/`K`/`A` records)
//! - **`search`**: Backtracking and best-first engines, with search
//!   budgets, visited-state memoization, and admissible heuristics
//! - **`queries`**: Earliest-completion sweep and minimum-capacity
//!   bisection drivers
//! - **`validation`**: Plan integrity checks
//! - **`error`**: Error taxonomy shared by loading and search setup
//!
//! # Example
//!
//! ```
//! use dagsched::input::ProblemInput;
//! use dagsched::queries::{EarliestCompletion, ScheduleResult};
//!
//! let input = ProblemInput::parse_str("N 1\nK 2\nA 1 2 0\nA 2 2 1 0\nA 3 1 1 0\n")?;
//! let workers = input.resolve_workers(None)?;
//! let budget = input.resolve_budget(None)?;
//! let graph = input.into_graph()?;
//!
//! match EarliestCompletion::new(&graph, workers, budget).run(10)? {
//!     ScheduleResult::Optimal { value, .. } => assert_eq!(value, 3),
//!     other => panic!("unexpected {other:?}"),
//! }
//! # Ok::<(), dagsched::error::Error>(())
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"
//! - Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach"

pub mod error;
pub mod input;
pub mod models;
pub mod queries;
pub mod search;
pub mod validation;
