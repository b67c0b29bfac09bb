//! Replication error types.

use crate::client::PlatformError;
use crate::templates::TemplateError;

/// Errors that stop the replay of a repository pair.
#[derive(Debug, thiserror::Error)]
pub enum ReplicationError {
    /// The destination or source is in a state replication cannot continue
    /// from, such as a missing branch for an open pull request or a created
    /// object that received the wrong number.
    #[error("Unexpected state: {0}")]
    UnexpectedState(String),

    /// A request failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A body template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
