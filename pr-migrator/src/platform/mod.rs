//! The operations the replication engine needs from a GitHub instance.
//!
//! [`Platform`] is implemented by [`GitHubPlatform`] for real instances and
//! by [`MemoryPlatform`] for tests and rehearsals. Lookups return `None` or
//! `false` for absent objects; every other failure is a [`PlatformError`].

mod github;
pub mod memory;
mod types;

pub use github::GitHubPlatform;
pub use memory::{MemoryOperation, MemoryPlatform};
pub use types::{
    Comment, FileCommit, GitRef, Issue, ItemKind, ItemState, Label, Milestone, NewIssue, NewPull,
    NewReviewComment, NumberedItem, PullRequest, ReviewComment, User,
};
pub(crate) use types::Created;

use crate::client::PlatformError;
use crate::pairs::Repository;
use async_trait::async_trait;

/// A GitHub instance as seen by the replication engine.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Display name of the instance.
    fn name(&self) -> &str;

    /// Highest number among the repository's issues and pull requests, 0 if none.
    async fn latest_number(&self, repo: &Repository) -> Result<u64, PlatformError>;

    /// Fetches a pull request, `None` if the number is not a pull request.
    async fn pull_request(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Option<PullRequest>, PlatformError>;

    /// Fetches an issue, `None` if the number is unassigned.
    async fn issue(&self, repo: &Repository, number: u64) -> Result<Option<Issue>, PlatformError>;

    /// Returns true if an issue or pull request holds the number.
    async fn number_exists(&self, repo: &Repository, number: u64) -> Result<bool, PlatformError>;

    /// Numbers of all open pull requests.
    async fn open_pull_numbers(&self, repo: &Repository) -> Result<Vec<u64>, PlatformError>;

    /// All issue comments of an issue or pull request, oldest first.
    async fn issue_comments(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<Comment>, PlatformError>;

    /// All inline review comments of a pull request, oldest first.
    async fn review_comments(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<ReviewComment>, PlatformError>;

    /// Returns true if the branch exists.
    async fn branch_exists(&self, repo: &Repository, branch: &str) -> Result<bool, PlatformError>;

    /// Creates a branch pointing at `sha`.
    async fn create_branch(
        &self,
        repo: &Repository,
        branch: &str,
        sha: &str,
    ) -> Result<(), PlatformError>;

    /// Deletes a branch.
    async fn delete_branch(&self, repo: &Repository, branch: &str) -> Result<(), PlatformError>;

    /// Commits one file onto a branch whose head must equal the expected oid.
    async fn commit_file(&self, repo: &Repository, commit: &FileCommit)
        -> Result<(), PlatformError>;

    /// Creates an issue and returns its number.
    async fn create_issue(&self, repo: &Repository, issue: &NewIssue) -> Result<u64, PlatformError>;

    /// Creates a pull request and returns its number.
    async fn create_pull(&self, repo: &Repository, pull: &NewPull) -> Result<u64, PlatformError>;

    /// Closes an issue or pull request.
    async fn close(
        &self,
        repo: &Repository,
        number: u64,
        kind: ItemKind,
    ) -> Result<(), PlatformError>;

    /// Adds labels to an issue or pull request.
    async fn add_labels(
        &self,
        repo: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), PlatformError>;

    /// Creates an issue comment.
    async fn create_issue_comment(
        &self,
        repo: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError>;

    /// Creates an inline review comment.
    async fn create_review_comment(
        &self,
        repo: &Repository,
        number: u64,
        comment: &NewReviewComment,
    ) -> Result<(), PlatformError>;
}
