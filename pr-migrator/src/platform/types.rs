//! Records read from and payloads written to a GitHub instance.
//!
//! Decoding ignores unknown fields, so full REST responses deserialize into
//! these trimmed records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of an issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
    Merged,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        })
    }
}

/// Whether a number denotes a pull request or a plain issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    PullRequest,
    Issue,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PullRequest => "pull request",
            Self::Issue => "issue",
        })
    }
}

/// Account that authored an item or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// Label attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Milestone an item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u64,
}

/// One side of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    /// Branch name.
    #[serde(rename = "ref")]
    pub name: String,

    /// Commit the branch pointed at.
    pub sha: String,
}

/// An issue as returned by `GET /repos/{owner}/{repo}/issues/{number}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: User,
    pub state: ItemState,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Number of issue comments.
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pull request as returned by `GET /repos/{owner}/{repo}/pulls/{number}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: User,
    pub state: ItemState,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Number of issue comments.
    #[serde(default)]
    pub comments: u64,
    /// Number of inline review comments.
    #[serde(default)]
    pub review_comments: u64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    pub head: GitRef,
    pub base: GitRef,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PullRequest {
    /// State with merged pull requests told apart from closed ones.
    #[must_use]
    pub fn effective_state(&self) -> ItemState {
        match self.state {
            ItemState::Closed if self.merged_at.is_some() => ItemState::Merged,
            state => state,
        }
    }
}

/// What a number denotes in a source repository.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberedItem {
    PullRequest(Box<PullRequest>),
    Issue(Box<Issue>),
    /// Neither a pull request nor an issue exists under the number.
    Absent,
}

impl NumberedItem {
    /// Kind of the item, if present.
    #[must_use]
    pub fn kind(&self) -> Option<ItemKind> {
        match self {
            Self::PullRequest(_) => Some(ItemKind::PullRequest),
            Self::Issue(_) => Some(ItemKind::Issue),
            Self::Absent => None,
        }
    }

    /// State of the item, if present.
    #[must_use]
    pub fn state(&self) -> Option<ItemState> {
        match self {
            Self::PullRequest(pr) => Some(pr.effective_state()),
            Self::Issue(issue) => Some(issue.state),
            Self::Absent => None,
        }
    }
}

/// An issue comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub user: User,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An inline pull request review comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub user: User,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub path: String,
    pub commit_id: String,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub start_line: Option<u64>,
    #[serde(default)]
    pub start_side: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
}

/// Body of `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPull {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
    pub locked: bool,
    /// Number the pull request is expected to receive.
    pub number: u64,
}

/// Body of `POST /repos/{owner}/{repo}/pulls/{number}/comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReviewComment {
    pub body: String,
    pub commit_id: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_side: Option<String>,
    /// `"file"` for comments that are not anchored to a line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<String>,
}

/// A single-file commit created on top of a known branch head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCommit {
    pub branch: String,
    /// The commit fails unless the branch still points here.
    pub expected_head_oid: String,
    pub path: String,
    pub contents: String,
    pub headline: String,
    pub body: String,
}

/// Number of a freshly created object, as returned by the instance.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Created {
    pub number: u64,
}
