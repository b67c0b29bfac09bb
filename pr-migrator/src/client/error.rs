//! API client error types.

use super::Method;
use thiserror::Error;

/// Errors that can occur while talking to a GitHub instance.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Transport or client construction error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    /// The instance answered with a status the caller cannot handle.
    #[error("Got {status} error from {method} {url}, message: {body}")]
    UnexpectedStatus {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    /// A response body did not match the expected shape.
    #[error("Failed to decode response from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A GraphQL request returned errors or no data.
    #[error("GraphQL request to {url} failed: {message}")]
    GraphQl { url: String, message: String },

    /// A URL could not be built.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl PlatformError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::GitHub(octocrab::Error::GitHub { source, .. }) => {
                Some(source.status_code.as_u16())
            }
            _ => None,
        }
    }
}
