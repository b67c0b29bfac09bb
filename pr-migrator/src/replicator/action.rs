//! Destination mutations as data.
//!
//! Every mutation the replicator wants to make is first planned through an
//! [`ActionLog`]. Live runs and dry runs plan the same sequence; only live
//! runs go on to execute it.

use crate::platform::ItemKind;
use std::fmt;
use tracing::info;

/// One mutation of the destination repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    CreateBranch { branch: String, sha: String },
    CommitPlaceholder { branch: String, path: String },
    CreatePull { number: u64, head: String, base: String },
    CreateIssue { number: u64 },
    AddLabels { number: u64, labels: Vec<String> },
    CopyIssueComments { number: u64, count: u64 },
    CopyReviewComments { number: u64, count: u64 },
    Close { number: u64, kind: ItemKind },
    DeleteBranch { branch: String },
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateBranch { branch, sha } => write!(f, "create branch {branch} at {sha}"),
            Self::CommitPlaceholder { branch, path } => {
                write!(f, "commit {path} to branch {branch}")
            }
            Self::CreatePull { number, head, base } => {
                write!(f, "create pull request #{number} from {head} into {base}")
            }
            Self::CreateIssue { number } => write!(f, "create issue #{number}"),
            Self::AddLabels { number, labels } => {
                write!(f, "add labels [{}] to #{number}", labels.join(", "))
            }
            Self::CopyIssueComments { number, count } => {
                write!(f, "copy {count} comments to #{number}")
            }
            Self::CopyReviewComments { number, count } => {
                write!(f, "copy {count} review comments to #{number}")
            }
            Self::Close { number, kind } => write!(f, "close {kind} #{number}"),
            Self::DeleteBranch { branch } => write!(f, "delete branch {branch}"),
        }
    }
}

/// Ordered record of the actions planned for one repository pair.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    dry_run: bool,
    actions: Vec<PlannedAction>,
}

impl ActionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            actions: Vec::new(),
        }
    }

    /// Records an action and returns whether to execute it.
    pub fn plan(&mut self, action: PlannedAction) -> bool {
        info!("Planned {action}");
        if self.dry_run {
            info!("Dry run - {action}");
        }
        self.actions.push(action);
        !self.dry_run
    }

    /// Actions planned so far.
    #[must_use]
    pub fn actions(&self) -> &[PlannedAction] {
        &self.actions
    }

    /// Consumes the log.
    #[must_use]
    pub fn into_actions(self) -> Vec<PlannedAction> {
        self.actions
    }
}
