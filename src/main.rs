//! Command-line front end for the day-scheduling queries.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::info;

use dagsched::error::Error;
use dagsched::input::ProblemInput;
use dagsched::queries::{EarliestCompletion, MinimumCapacity, ScheduleResult};
use dagsched::search::{SearchBudget, SearchOptions};

#[derive(Debug, Parser)]
#[command(
    name = "dagsched",
    about = "Schedule dependent tasks across workers and days",
    version
)]
struct Cli {
    /// Problem file with N/K/A records
    input: PathBuf,

    /// Planning horizon in days: the sweep cap for the earliest-completion
    /// query and the fixed grid depth for the capacity query
    horizon: usize,

    /// Worker count, overriding the file's N directive
    workers: Option<usize>,

    /// Daily per-worker budget, overriding the file's K directive
    budget: Option<u32>,

    /// Make tasks wait until the day after their dependencies complete
    #[arg(long = "nextday")]
    next_day: bool,

    /// Print the witness schedule grouped by day and worker
    #[arg(long)]
    print_schedule: bool,

    /// Which query to answer
    #[arg(long, value_enum, default_value = "both")]
    query: Query,

    /// Stop searching after this many node expansions
    #[arg(long)]
    max_nodes: Option<u64>,

    /// Stop searching after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Query {
    /// Smallest horizon that fits every task
    Earliest,
    /// Smallest daily budget that fits the horizon
    Capacity,
    /// Run both queries
    Both,
}

impl Query {
    fn wants_earliest(self) -> bool {
        matches!(self, Query::Earliest | Query::Both)
    }

    fn wants_capacity(self) -> bool {
        matches!(self, Query::Capacity | Query::Both)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dagsched=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        // A cycle is a verdict about the instance, not a usage error.
        Err(Error::CyclicDependency(tasks)) => {
            println!("infeasible: cyclic dependency among tasks {tasks}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            if let Some(source) = std::error::Error::source(&err) {
                eprintln!("  caused by: {source}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let input = ProblemInput::load_path(&cli.input)?;
    let workers = input.resolve_workers(cli.workers)?;
    let daily_budget = input.resolve_budget(cli.budget)?;
    let graph = input.into_graph()?;
    info!(
        tasks = graph.len(),
        workers,
        daily_budget,
        horizon = cli.horizon,
        "problem loaded"
    );

    let options = SearchOptions::default().with_next_day_rule(cli.next_day);
    let budget = search_budget(cli);

    if cli.query.wants_earliest() {
        let result = EarliestCompletion::new(&graph, workers, daily_budget)
            .with_options(options)
            .with_budget(budget)
            .run(cli.horizon)?;
        report(cli, "earliest completion", "day(s)", &result);
    }
    if cli.query.wants_capacity() {
        let result = MinimumCapacity::new(&graph, workers, cli.horizon)
            .with_options(options)
            .with_budget(budget)
            .run()?;
        report(cli, "minimum daily budget", "unit(s) per worker", &result);
    }
    Ok(())
}

fn search_budget(cli: &Cli) -> SearchBudget {
    SearchBudget {
        max_nodes: cli.max_nodes,
        time_limit: cli.time_limit_ms.map(Duration::from_millis),
    }
}

fn report(cli: &Cli, label: &str, unit: &str, result: &ScheduleResult) {
    match result {
        ScheduleResult::Optimal { value, plan } => {
            println!("{label}: {value} {unit}");
            if cli.print_schedule && !plan.is_empty() {
                println!("{plan}");
            }
        }
        ScheduleResult::Unsat => {
            println!("{label}: no valid schedule within {} day(s)", cli.horizon);
        }
        ScheduleResult::Timeout => {
            println!("{label}: search limit reached before a verdict");
        }
    }
}
