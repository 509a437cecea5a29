//! Error types shared across the crate.
//!
//! Structural problems are caught once, while loading: the search engines
//! never see a malformed record set or a cyclic task graph. Outcomes that
//! are answers rather than failures (an infeasible horizon, an exhausted
//! search budget) are not errors and live in the result enums instead.

use thiserror::Error;

/// Convenience alias used by fallible operations throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a problem or preparing a search.
#[derive(Debug, Error)]
pub enum Error {
    /// The input text or record set violates the problem grammar.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The dependency relation contains a cycle; no schedule can exist.
    #[error("cyclic dependency among tasks {0}")]
    CyclicDependency(String),

    /// A required parameter was neither in the input nor supplied by the caller.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// The input file could not be read.
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
