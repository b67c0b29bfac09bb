//! Runner error types.

/// Setup failures that prevent a run from starting.
///
/// Failures while replaying a pair are recorded in the run summary instead.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// An instance's URLs cannot be used.
    #[error("Invalid {role} instance: {message}")]
    Instance { role: &'static str, message: String },

    /// API client initialization errors.
    #[error(transparent)]
    Platform(#[from] crate::client::PlatformError),

    /// Template override compilation errors.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// The repository pairs could not be read.
    #[error("Failed to read repository pairs: {0}")]
    Input(#[from] std::io::Error),
}
