//! Template error types.

/// Failure to compile or render a body template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A template failed to render, usually a variable it names is unknown.
    #[error("Failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),

    /// A template failed to compile.
    #[error("Failed to compile template '{name}': {source}")]
    Registration {
        name: &'static str,
        #[source]
        source: handlebars::TemplateError,
    },
}
