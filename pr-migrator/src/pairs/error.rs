//! Repository pair parsing errors.

use thiserror::Error;

/// Errors that can occur while parsing an input line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    /// The line is neither `org/repo` nor `org/repo,org/repo`.
    #[error("Invalid org/repository name '{line}': {reason}")]
    Invalid { line: String, reason: String },

    /// A destination-only line whose org lacks the configured prefix.
    #[error("Cannot infer source org for '{org}': expected prefix '{prefix}'")]
    MissingPrefix { org: String, prefix: String },
}
