//! Head branches of replayed pull requests.
//!
//! A pull request can only be created when its head branch exists on the
//! destination. Branches of open pull requests must have been pushed
//! beforehand; for closed ones a synthetic branch is created from the base
//! commit with a single placeholder commit on top, and deleted again once
//! the pull request is closed.

use crate::pairs::Repository;
use crate::platform::{FileCommit, ItemState, Platform, PullRequest};
use crate::replicator::{ActionLog, PlannedAction, ReplicationError};
use crate::templates::{placeholder_headline, placeholder_path, TemplateRenderer};
use bstr::ByteSlice;
use tracing::{debug, info};

/// Whether the head branch had to be synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchOutcome {
    /// The branch was already on the destination.
    pub existed: bool,
}

/// Checks that a branch name is a valid git reference name.
///
/// # Errors
///
/// Returns [`ReplicationError::UnexpectedState`] for invalid names.
pub fn validate_branch_name(branch: &str) -> Result<(), ReplicationError> {
    let full_name = format!("refs/heads/{branch}");
    gix_validate::reference::name(full_name.as_bytes().as_bstr())
        .map(drop)
        .map_err(|e| {
            ReplicationError::UnexpectedState(format!("invalid branch name '{branch}': {e}"))
        })
}

/// Makes sure the head branch of `pull` exists on the destination.
///
/// # Errors
///
/// Returns [`ReplicationError::UnexpectedState`] when an open pull request's
/// branch is missing or the branch name is invalid, and propagates request
/// and template failures.
pub async fn ensure_branch(
    destination: &dyn Platform,
    repo: &Repository,
    pull: &PullRequest,
    renderer: &TemplateRenderer,
    log: &mut ActionLog,
) -> Result<BranchOutcome, ReplicationError> {
    let branch = pull.head.name.as_str();
    validate_branch_name(branch)?;

    if destination.branch_exists(repo, branch).await? {
        info!(branch, "Found branch");
        return Ok(BranchOutcome { existed: true });
    }

    if pull.state == ItemState::Open {
        return Err(ReplicationError::UnexpectedState(format!(
            "For open pull request #{}, expected the branch {branch} to already exist. \
             Push all branches for open pull requests to {repo} and try again.",
            pull.number
        )));
    }

    info!(branch, sha = %pull.base.sha, "Branch not found, creating it from the base commit");
    if log.plan(PlannedAction::CreateBranch {
        branch: branch.to_string(),
        sha: pull.base.sha.clone(),
    }) {
        destination
            .create_branch(repo, branch, &pull.base.sha)
            .await?;
    }

    let path = placeholder_path(branch);
    let contents = renderer.render_placeholder(pull.number, &pull.html_url, branch)?;
    debug!(branch, path, "Rendered placeholder");
    if log.plan(PlannedAction::CommitPlaceholder {
        branch: branch.to_string(),
        path: path.clone(),
    }) {
        let commit = FileCommit {
            branch: branch.to_string(),
            expected_head_oid: pull.base.sha.clone(),
            path,
            headline: placeholder_headline(pull.number),
            body: contents.clone(),
            contents,
        };
        destination.commit_file(repo, &commit).await?;
    }

    Ok(BranchOutcome { existed: false })
}
