//! In-memory [`Platform`] for tests and rehearsals.
//!
//! Numbers are handed out sequentially per repository, the way a GitHub
//! instance does, and every mutation is appended to an operation log.

use super::{
    Comment, FileCommit, GitRef, Issue, ItemKind, ItemState, Label, NewIssue, NewPull,
    NewReviewComment, NumberedItem, Platform, PullRequest, ReviewComment, User,
};
use crate::client::{Method, PlatformError};
use crate::pairs::Repository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Login recorded as the author of objects created through the platform.
pub const MEMORY_LOGIN: &str = "migrator";

/// A mutation applied to a [`MemoryPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryOperation {
    CreateBranch {
        repo: Repository,
        branch: String,
        sha: String,
    },
    DeleteBranch {
        repo: Repository,
        branch: String,
    },
    CommitFile {
        repo: Repository,
        branch: String,
        path: String,
    },
    CreateIssue {
        repo: Repository,
        number: u64,
    },
    CreatePull {
        repo: Repository,
        number: u64,
        head: String,
    },
    Close {
        repo: Repository,
        number: u64,
        kind: ItemKind,
    },
    AddLabels {
        repo: Repository,
        number: u64,
        labels: Vec<String>,
    },
    CreateIssueComment {
        repo: Repository,
        number: u64,
    },
    CreateReviewComment {
        repo: Repository,
        number: u64,
    },
}

#[derive(Debug, Default)]
struct RepositoryState {
    items: BTreeMap<u64, NumberedItem>,
    branches: BTreeMap<String, String>,
    files: BTreeMap<(String, String), String>,
    issue_comments: BTreeMap<u64, Vec<Comment>>,
    review_comments: BTreeMap<u64, Vec<ReviewComment>>,
    /// Highest number handed out or preloaded.
    counter: u64,
}

impl RepositoryState {
    fn take_number(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn claim(&mut self, number: u64) {
        self.counter = self.counter.max(number);
    }
}

#[derive(Debug, Default)]
struct State {
    repositories: HashMap<Repository, RepositoryState>,
    operations: Vec<MemoryOperation>,
    commits: u64,
}

/// A GitHub instance held in memory.
#[derive(Debug)]
pub struct MemoryPlatform {
    name: String,
    state: Mutex<State>,
}

impl MemoryPlatform {
    /// Creates an empty instance.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn url(&self, repo: &Repository, path: &str) -> String {
        format!("memory://{}/repos/{repo}/{path}", self.name)
    }

    /// Preloads a pull request.
    pub fn insert_pull(&self, repo: &Repository, pull: PullRequest) {
        let mut state = self.lock();
        let repo_state = state.repositories.entry(repo.clone()).or_default();
        repo_state.claim(pull.number);
        repo_state
            .items
            .insert(pull.number, NumberedItem::PullRequest(Box::new(pull)));
    }

    /// Preloads an issue.
    pub fn insert_issue(&self, repo: &Repository, issue: Issue) {
        let mut state = self.lock();
        let repo_state = state.repositories.entry(repo.clone()).or_default();
        repo_state.claim(issue.number);
        repo_state
            .items
            .insert(issue.number, NumberedItem::Issue(Box::new(issue)));
    }

    /// Preloads a branch.
    pub fn insert_branch(&self, repo: &Repository, branch: &str, sha: &str) {
        self.lock()
            .repositories
            .entry(repo.clone())
            .or_default()
            .branches
            .insert(branch.to_string(), sha.to_string());
    }

    /// Preloads an issue comment.
    pub fn insert_issue_comment(&self, repo: &Repository, number: u64, comment: Comment) {
        self.lock()
            .repositories
            .entry(repo.clone())
            .or_default()
            .issue_comments
            .entry(number)
            .or_default()
            .push(comment);
    }

    /// Preloads a review comment.
    pub fn insert_review_comment(&self, repo: &Repository, number: u64, comment: ReviewComment) {
        self.lock()
            .repositories
            .entry(repo.clone())
            .or_default()
            .review_comments
            .entry(number)
            .or_default()
            .push(comment);
    }

    /// Consumes numbers without creating visible objects, like deleted
    /// issues do on a real instance.
    pub fn burn_numbers(&self, repo: &Repository, count: u64) {
        let mut state = self.lock();
        let repo_state = state.repositories.entry(repo.clone()).or_default();
        repo_state.counter += count;
    }

    /// Every mutation applied so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<MemoryOperation> {
        self.lock().operations.clone()
    }

    /// Number of mutations applied so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.lock().operations.len()
    }

    /// The item stored under a number.
    #[must_use]
    pub fn item(&self, repo: &Repository, number: u64) -> Option<NumberedItem> {
        self.lock()
            .repositories
            .get(repo)
            .and_then(|r| r.items.get(&number).cloned())
    }

    /// Names of all branches.
    #[must_use]
    pub fn branches(&self, repo: &Repository) -> Vec<String> {
        self.lock()
            .repositories
            .get(repo)
            .map(|r| r.branches.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Contents of a committed file.
    #[must_use]
    pub fn file(&self, repo: &Repository, branch: &str, path: &str) -> Option<String> {
        self.lock()
            .repositories
            .get(repo)
            .and_then(|r| r.files.get(&(branch.to_string(), path.to_string())).cloned())
    }

    /// Issue comments stored under a number.
    #[must_use]
    pub fn stored_issue_comments(&self, repo: &Repository, number: u64) -> Vec<Comment> {
        self.lock()
            .repositories
            .get(repo)
            .and_then(|r| r.issue_comments.get(&number).cloned())
            .unwrap_or_default()
    }

    /// Review comments stored under a number.
    #[must_use]
    pub fn stored_review_comments(&self, repo: &Repository, number: u64) -> Vec<ReviewComment> {
        self.lock()
            .repositories
            .get(repo)
            .and_then(|r| r.review_comments.get(&number).cloned())
            .unwrap_or_default()
    }
}

fn rejected(method: Method, url: String, status: u16, message: &str) -> PlatformError {
    PlatformError::UnexpectedStatus {
        method,
        url,
        status,
        body: format!(r#"{{"message":"{message}"}}"#),
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    async fn latest_number(&self, repo: &Repository) -> Result<u64, PlatformError> {
        Ok(self
            .lock()
            .repositories
            .get(repo)
            .and_then(|r| r.items.keys().next_back().copied())
            .unwrap_or(0))
    }

    async fn pull_request(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Option<PullRequest>, PlatformError> {
        Ok(match self.item(repo, number) {
            Some(NumberedItem::PullRequest(pull)) => Some(*pull),
            _ => None,
        })
    }

    async fn issue(&self, repo: &Repository, number: u64) -> Result<Option<Issue>, PlatformError> {
        Ok(match self.item(repo, number) {
            Some(NumberedItem::Issue(issue)) => Some(*issue),
            _ => None,
        })
    }

    async fn number_exists(&self, repo: &Repository, number: u64) -> Result<bool, PlatformError> {
        Ok(self.item(repo, number).is_some())
    }

    async fn open_pull_numbers(&self, repo: &Repository) -> Result<Vec<u64>, PlatformError> {
        Ok(self
            .lock()
            .repositories
            .get(repo)
            .map(|r| {
                r.items
                    .values()
                    .filter_map(|item| match item {
                        NumberedItem::PullRequest(pull) if pull.state == ItemState::Open => {
                            Some(pull.number)
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn issue_comments(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<Comment>, PlatformError> {
        if self.item(repo, number).is_none() {
            let url = self.url(repo, &format!("issues/{number}/comments"));
            return Err(rejected(Method::Get, url, 404, "Not Found"));
        }
        Ok(self.stored_issue_comments(repo, number))
    }

    async fn review_comments(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<ReviewComment>, PlatformError> {
        if !matches!(self.item(repo, number), Some(NumberedItem::PullRequest(_))) {
            let url = self.url(repo, &format!("pulls/{number}/comments"));
            return Err(rejected(Method::Get, url, 404, "Not Found"));
        }
        Ok(self.stored_review_comments(repo, number))
    }

    async fn branch_exists(&self, repo: &Repository, branch: &str) -> Result<bool, PlatformError> {
        Ok(self
            .lock()
            .repositories
            .get(repo)
            .is_some_and(|r| r.branches.contains_key(branch)))
    }

    async fn create_branch(
        &self,
        repo: &Repository,
        branch: &str,
        sha: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        let repo_state = state.repositories.entry(repo.clone()).or_default();
        if repo_state.branches.contains_key(branch) {
            let url = self.url(repo, "git/refs");
            return Err(rejected(Method::Post, url, 422, "Reference already exists"));
        }
        repo_state
            .branches
            .insert(branch.to_string(), sha.to_string());
        state.operations.push(MemoryOperation::CreateBranch {
            repo: repo.clone(),
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        Ok(())
    }

    async fn delete_branch(&self, repo: &Repository, branch: &str) -> Result<(), PlatformError> {
        let mut state = self.lock();
        let removed = state
            .repositories
            .get_mut(repo)
            .and_then(|r| r.branches.remove(branch));
        if removed.is_none() {
            let url = self.url(repo, &format!("git/refs/heads/{branch}"));
            return Err(rejected(Method::Delete, url, 422, "Reference does not exist"));
        }
        state.operations.push(MemoryOperation::DeleteBranch {
            repo: repo.clone(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    async fn commit_file(
        &self,
        repo: &Repository,
        commit: &FileCommit,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.commits += 1;
        let oid = format!("{:040x}", state.commits);

        let graphql = |message: String| PlatformError::GraphQl {
            url: format!("memory://{}/graphql", self.name),
            message,
        };
        let Some(repo_state) = state.repositories.get_mut(repo) else {
            return Err(graphql(format!("Could not resolve to a Repository {repo}")));
        };
        let Some(head) = repo_state.branches.get_mut(&commit.branch) else {
            return Err(graphql(format!("Branch {} not found", commit.branch)));
        };
        if *head != commit.expected_head_oid {
            return Err(graphql(format!(
                "Expected branch to point to \"{}\" but it did not",
                commit.expected_head_oid
            )));
        }

        *head = oid;
        repo_state.files.insert(
            (commit.branch.clone(), commit.path.clone()),
            commit.contents.clone(),
        );
        state.operations.push(MemoryOperation::CommitFile {
            repo: repo.clone(),
            branch: commit.branch.clone(),
            path: commit.path.clone(),
        });
        Ok(())
    }

    async fn create_issue(&self, repo: &Repository, issue: &NewIssue) -> Result<u64, PlatformError> {
        let mut state = self.lock();
        let repo_state = state.repositories.entry(repo.clone()).or_default();
        let number = repo_state.take_number();
        let now = Utc::now();
        let created = Issue {
            number,
            title: issue.title.clone(),
            body: Some(issue.body.clone()),
            user: User {
                login: MEMORY_LOGIN.to_string(),
            },
            state: ItemState::Open,
            html_url: format!("memory://{}/{repo}/issues/{number}", self.name),
            labels: Vec::new(),
            comments: 0,
            locked: false,
            milestone: None,
            created_at: now,
            updated_at: now,
        };
        repo_state
            .items
            .insert(number, NumberedItem::Issue(Box::new(created)));
        state.operations.push(MemoryOperation::CreateIssue {
            repo: repo.clone(),
            number,
        });
        Ok(number)
    }

    async fn create_pull(&self, repo: &Repository, pull: &NewPull) -> Result<u64, PlatformError> {
        let mut state = self.lock();
        let repo_state = state.repositories.entry(repo.clone()).or_default();
        let Some(head_sha) = repo_state.branches.get(&pull.head).cloned() else {
            let url = self.url(repo, "pulls");
            return Err(rejected(Method::Post, url, 422, "Validation Failed: head invalid"));
        };
        let base_sha = repo_state
            .branches
            .get(&pull.base)
            .cloned()
            .unwrap_or_default();

        let number = repo_state.take_number();
        let now = Utc::now();
        let created = PullRequest {
            number,
            title: pull.title.clone(),
            body: Some(pull.body.clone()),
            user: User {
                login: MEMORY_LOGIN.to_string(),
            },
            state: ItemState::Open,
            html_url: format!("memory://{}/{repo}/pull/{number}", self.name),
            labels: Vec::new(),
            comments: 0,
            review_comments: 0,
            locked: pull.locked,
            draft: pull.draft,
            milestone: None,
            head: GitRef {
                name: pull.head.clone(),
                sha: head_sha,
            },
            base: GitRef {
                name: pull.base.clone(),
                sha: base_sha,
            },
            merged_at: None,
            created_at: now,
            updated_at: now,
        };
        repo_state
            .items
            .insert(number, NumberedItem::PullRequest(Box::new(created)));
        state.operations.push(MemoryOperation::CreatePull {
            repo: repo.clone(),
            number,
            head: pull.head.clone(),
        });
        Ok(number)
    }

    async fn close(
        &self,
        repo: &Repository,
        number: u64,
        kind: ItemKind,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        let item = state
            .repositories
            .get_mut(repo)
            .and_then(|r| r.items.get_mut(&number));
        match (item, kind) {
            // The issues endpoint closes pull requests too.
            (Some(NumberedItem::PullRequest(pull)), _) => {
                pull.state = ItemState::Closed;
            }
            (Some(NumberedItem::Issue(issue)), ItemKind::Issue) => {
                issue.state = ItemState::Closed;
            }
            _ => {
                let collection = match kind {
                    ItemKind::PullRequest => "pulls",
                    ItemKind::Issue => "issues",
                };
                let url = self.url(repo, &format!("{collection}/{number}"));
                return Err(rejected(Method::Patch, url, 404, "Not Found"));
            }
        }
        state.operations.push(MemoryOperation::Close {
            repo: repo.clone(),
            number,
            kind,
        });
        Ok(())
    }

    async fn add_labels(
        &self,
        repo: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        let item = state
            .repositories
            .get_mut(repo)
            .and_then(|r| r.items.get_mut(&number));
        let existing = match item {
            Some(NumberedItem::PullRequest(pull)) => &mut pull.labels,
            Some(NumberedItem::Issue(issue)) => &mut issue.labels,
            _ => {
                let url = self.url(repo, &format!("issues/{number}/labels"));
                return Err(rejected(Method::Post, url, 404, "Not Found"));
            }
        };
        for label in labels {
            if !existing.iter().any(|l| &l.name == label) {
                existing.push(Label {
                    name: label.clone(),
                });
            }
        }
        state.operations.push(MemoryOperation::AddLabels {
            repo: repo.clone(),
            number,
            labels: labels.to_vec(),
        });
        Ok(())
    }

    async fn create_issue_comment(
        &self,
        repo: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        let Some(repo_state) = state
            .repositories
            .get_mut(repo)
            .filter(|r| r.items.contains_key(&number))
        else {
            let url = self.url(repo, &format!("issues/{number}/comments"));
            return Err(rejected(Method::Post, url, 404, "Not Found"));
        };

        let comments = repo_state.issue_comments.entry(number).or_default();
        let now = Utc::now();
        comments.push(Comment {
            id: comments.len() as u64 + 1,
            user: User {
                login: MEMORY_LOGIN.to_string(),
            },
            body: Some(body.to_string()),
            html_url: format!("memory://{}/{repo}/issues/{number}#comment", self.name),
            created_at: now,
            updated_at: now,
        });
        state.operations.push(MemoryOperation::CreateIssueComment {
            repo: repo.clone(),
            number,
        });
        Ok(())
    }

    async fn create_review_comment(
        &self,
        repo: &Repository,
        number: u64,
        comment: &NewReviewComment,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        let Some(repo_state) = state
            .repositories
            .get_mut(repo)
            .filter(|r| matches!(r.items.get(&number), Some(NumberedItem::PullRequest(_))))
        else {
            let url = self.url(repo, &format!("pulls/{number}/comments"));
            return Err(rejected(Method::Post, url, 404, "Not Found"));
        };

        let comments = repo_state.review_comments.entry(number).or_default();
        let now = Utc::now();
        comments.push(ReviewComment {
            id: comments.len() as u64 + 1,
            user: User {
                login: MEMORY_LOGIN.to_string(),
            },
            body: Some(comment.body.clone()),
            html_url: format!("memory://{}/{repo}/pull/{number}#discussion", self.name),
            path: comment.path.clone(),
            commit_id: comment.commit_id.clone(),
            line: comment.line,
            side: comment.side.clone(),
            start_line: comment.start_line,
            start_side: comment.start_side.clone(),
            created_at: now,
            updated_at: now,
        });
        state.operations.push(MemoryOperation::CreateReviewComment {
            repo: repo.clone(),
            number,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repository {
        Repository::new("org", "repo")
    }

    fn new_issue(title: &str) -> NewIssue {
        NewIssue {
            title: title.to_string(),
            body: String::new(),
            milestone: None,
        }
    }

    #[tokio::test]
    async fn numbers_are_sequential_after_burned_numbers() {
        let platform = MemoryPlatform::new("memory");
        assert_eq!(platform.create_issue(&repo(), &new_issue("a")).await.unwrap(), 1);

        platform.burn_numbers(&repo(), 2);
        assert_eq!(platform.create_issue(&repo(), &new_issue("b")).await.unwrap(), 4);
        assert_eq!(platform.latest_number(&repo()).await.unwrap(), 4);
        assert!(!platform.number_exists(&repo(), 2).await.unwrap());
    }

    #[tokio::test]
    async fn pull_requires_head_branch() {
        let platform = MemoryPlatform::new("memory");
        let pull = NewPull {
            title: "t".to_string(),
            body: String::new(),
            head: "feature".to_string(),
            base: "main".to_string(),
            draft: false,
            locked: false,
            number: 1,
        };

        let err = platform.create_pull(&repo(), &pull).await.unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(platform.mutation_count(), 0);

        platform.insert_branch(&repo(), "feature", "abc");
        assert_eq!(platform.create_pull(&repo(), &pull).await.unwrap(), 1);
        assert_eq!(platform.open_pull_numbers(&repo()).await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn commit_checks_expected_head() {
        let platform = MemoryPlatform::new("memory");
        platform.insert_branch(&repo(), "feature", "abc");
        let mut commit = FileCommit {
            branch: "feature".to_string(),
            expected_head_oid: "def".to_string(),
            path: "placeholder-feature.md".to_string(),
            contents: "hello".to_string(),
            headline: "h".to_string(),
            body: String::new(),
        };

        assert!(matches!(
            platform.commit_file(&repo(), &commit).await,
            Err(PlatformError::GraphQl { .. })
        ));

        commit.expected_head_oid = "abc".to_string();
        platform.commit_file(&repo(), &commit).await.unwrap();
        assert_eq!(
            platform.file(&repo(), "feature", "placeholder-feature.md").as_deref(),
            Some("hello")
        );
    }

    #[tokio::test]
    async fn deleting_missing_branch_is_rejected() {
        let platform = MemoryPlatform::new("memory");
        let err = platform.delete_branch(&repo(), "gone").await.unwrap_err();
        assert_eq!(err.status(), Some(422));
    }
}
