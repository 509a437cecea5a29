//! Problem text parsing.
//!
//! Problems arrive as line-oriented text. Lines starting with `%` are
//! comments, blank lines are skipped, and each remaining line carries
//! one directive:
//!
//! ```text
//! % two workers, five units each per day
//! N 2
//! K 5
//! % A <id> <cost> <dependency ids...> 0
//! A 1 3 0
//! A 2 2 1 0
//! ```
//!
//! Every task record ends with the terminator `0`, which is why `0` can
//! never name a task. `N` and `K` may be repeated; the last value wins.
//! Unknown directives are skipped with a warning so that annotated
//! problem files stay loadable.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{Task, TaskGraph};

/// A parsed problem file: parameters plus raw task records.
///
/// Records are not yet cross-checked; [`ProblemInput::into_graph`] runs
/// the referential validation.
#[derive(Debug, Clone, Default)]
pub struct ProblemInput {
    /// Worker count from the last `N` directive, if any.
    pub workers: Option<usize>,
    /// Daily budget from the last `K` directive, if any.
    pub daily_budget: Option<u32>,
    /// Task records in file order.
    pub tasks: Vec<Task>,
}

impl ProblemInput {
    /// Parses problem text.
    pub fn parse_str(text: &str) -> Result<Self> {
        let mut input = Self::default();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens[0] {
                "N" => {
                    let value = parse_parameter(&tokens, line_no, "worker count")?;
                    if input.workers.replace(value as usize).is_some() {
                        warn!(line = line_no, "worker count redefined, last value wins");
                    }
                }
                "K" => {
                    let value = parse_parameter(&tokens, line_no, "daily budget")?;
                    if input.daily_budget.replace(value).is_some() {
                        warn!(line = line_no, "daily budget redefined, last value wins");
                    }
                }
                "A" => input.tasks.push(parse_task(&tokens, line_no)?),
                other => {
                    warn!(line = line_no, directive = other, "unknown directive skipped");
                }
            }
        }
        Ok(input)
    }

    /// Reads and parses a problem file.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_str(&text)
    }

    /// Worker count, preferring an explicit override over the file.
    pub fn resolve_workers(&self, explicit: Option<usize>) -> Result<usize> {
        let value = explicit
            .or(self.workers)
            .ok_or(Error::MissingParameter("worker count (N)"))?;
        if value == 0 {
            return Err(Error::MalformedInput(
                "worker count must be at least 1".into(),
            ));
        }
        Ok(value)
    }

    /// Daily budget, preferring an explicit override over the file.
    pub fn resolve_budget(&self, explicit: Option<u32>) -> Result<u32> {
        let value = explicit
            .or(self.daily_budget)
            .ok_or(Error::MissingParameter("daily budget (K)"))?;
        if value == 0 {
            return Err(Error::MalformedInput(
                "daily budget must be at least 1".into(),
            ));
        }
        Ok(value)
    }

    /// Cross-validates the records and builds the dependency graph.
    pub fn into_graph(self) -> Result<TaskGraph> {
        TaskGraph::load(self.tasks)
    }
}

fn parse_parameter(tokens: &[&str], line_no: usize, what: &str) -> Result<u32> {
    let [_, token] = tokens else {
        return Err(Error::MalformedInput(format!(
            "line {line_no}: {what} directive takes exactly one value"
        )));
    };
    let value = parse_number(token, line_no, what)?;
    if value == 0 {
        return Err(Error::MalformedInput(format!(
            "line {line_no}: {what} must be at least 1"
        )));
    }
    Ok(value)
}

fn parse_task(tokens: &[&str], line_no: usize) -> Result<Task> {
    // A <id> <cost> <deps...> 0
    if tokens.len() < 4 {
        return Err(Error::MalformedInput(format!(
            "line {line_no}: task record needs an id, a cost, and a terminated dependency list"
        )));
    }
    let id = parse_number(tokens[1], line_no, "task id")?;
    if id == 0 {
        return Err(Error::MalformedInput(format!(
            "line {line_no}: task id 0 is reserved for the list terminator"
        )));
    }
    let cost = parse_number(tokens[2], line_no, "task cost")?;
    if cost == 0 {
        return Err(Error::MalformedInput(format!(
            "line {line_no}: task cost must be at least 1"
        )));
    }

    let Some((&terminator, deps)) = tokens[3..].split_last() else {
        return Err(Error::MalformedInput(format!(
            "line {line_no}: dependency list must end with 0"
        )));
    };
    if terminator != "0" {
        return Err(Error::MalformedInput(format!(
            "line {line_no}: dependency list must end with 0"
        )));
    }

    let mut task = Task::new(id, cost);
    for token in deps {
        let dep = parse_number(token, line_no, "dependency id")?;
        if dep == 0 {
            return Err(Error::MalformedInput(format!(
                "line {line_no}: dependency 0 appears before the end of the list"
            )));
        }
        if dep == id {
            return Err(Error::MalformedInput(format!(
                "line {line_no}: task {id} lists itself as a dependency"
            )));
        }
        task = task.with_dep(dep);
    }
    Ok(task)
}

fn parse_number(token: &str, line_no: usize, what: &str) -> Result<u32> {
    token.parse().map_err(|_| {
        Error::MalformedInput(format!(
            "line {line_no}: {what} must be an integer, got '{token}'"
        ))
    })
}
