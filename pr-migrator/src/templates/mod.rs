//! Bodies written to the destination.
//!
//! Every replayed object carries an attribution back to its original. The
//! bodies are Handlebars templates that can be overridden from the settings
//! file.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, Attribution, TemplateRenderer};

/// Name of the pull request and issue body template.
pub const PULL_BODY: &str = "pull-body";

/// Name of the comment body template.
pub const COMMENT_BODY: &str = "comment-body";

/// Name of the placeholder file template.
pub const PLACEHOLDER: &str = "placeholder";

/// Login credited in attributions: `{login}_{suffix}`.
#[must_use]
pub fn suffixed_login(login: &str, suffix: &str) -> String {
    format!("{login}_{suffix}")
}

/// Path of the placeholder file committed to a synthetic branch.
///
/// Slashes in the branch name are kept, so the file may land in a directory.
#[must_use]
pub fn placeholder_path(branch: &str) -> String {
    format!("placeholder-{branch}.md")
}

/// Headline of the placeholder commit.
#[must_use]
pub fn placeholder_headline(number: u64) -> String {
    format!("Placeholder commit for pull request #{number}")
}

/// Title of the closed issue that fills a missing source number.
#[must_use]
pub fn gap_title(number: u64) -> String {
    format!("Placeholder for missing #{number}")
}

/// Body of the closed issue that fills a missing source number.
#[must_use]
pub fn gap_body(number: u64, source: &str) -> String {
    format!(
        "Number #{number} does not exist in {source}. This issue keeps later numbers aligned."
    )
}
