//! Number classification.

use crate::client::PlatformError;
use crate::pairs::Repository;
use crate::platform::{NumberedItem, Platform};
use tracing::info;

/// Determines what a number denotes in the source repository.
///
/// The pull request endpoint is asked first since the issue endpoint also
/// answers for pull requests.
///
/// # Errors
///
/// Returns [`PlatformError`] for any failure other than absence.
pub async fn classify(
    source: &dyn Platform,
    repo: &Repository,
    number: u64,
) -> Result<NumberedItem, PlatformError> {
    if let Some(pull) = source.pull_request(repo, number).await? {
        return Ok(NumberedItem::PullRequest(Box::new(pull)));
    }

    info!(%repo, number, "Number is not a pull request, it might be an issue");
    if let Some(issue) = source.issue(repo, number).await? {
        return Ok(NumberedItem::Issue(Box::new(issue)));
    }

    info!(%repo, number, "Number is neither a pull request nor an issue");
    Ok(NumberedItem::Absent)
}
