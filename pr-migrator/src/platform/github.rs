//! [`Platform`] backed by a real GitHub instance.

use super::{
    Comment, Created, FileCommit, Issue, ItemKind, NewIssue, NewPull, NewReviewComment, Platform,
    PullRequest, ReviewComment,
};
use crate::client::pagination::{drain, drain_connection, with_page_size};
use crate::client::{ApiClient, Method, PlatformError};
use crate::pairs::Repository;
use crate::rate_limit::RequestKind;
use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

const LATEST_NUMBER_QUERY: &str = r"
query LatestNumber($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name, followRenames: true) {
    pullRequests(orderBy: {field: CREATED_AT, direction: DESC}, first: 1) {
      nodes { number }
    }
    issues(orderBy: {field: CREATED_AT, direction: DESC}, first: 1) {
      nodes { number }
    }
  }
}";

const OPEN_PULLS_QUERY: &str = r"
query OpenPullRequests($owner: String!, $name: String!, $after: String) {
  repository(owner: $owner, name: $name, followRenames: true) {
    pullRequests(states: OPEN, orderBy: {field: CREATED_AT, direction: DESC}, first: 100, after: $after) {
      nodes { number }
      pageInfo { endCursor hasNextPage }
    }
  }
}";

const CREATE_COMMIT_MUTATION: &str = r"
mutation CreateCommitOnBranch($input: CreateCommitOnBranchInput!) {
  createCommitOnBranch(input: $input) {
    commit { oid }
  }
}";

const OPEN_PULLS_PATH: &[&str] = &["repository", "pullRequests"];

#[derive(Debug, Deserialize)]
struct LatestData {
    repository: Option<LatestRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestRepository {
    pull_requests: NumberNodes,
    issues: NumberNodes,
}

#[derive(Debug, Deserialize)]
struct NumberNodes {
    nodes: Vec<NumberNode>,
}

#[derive(Debug, Deserialize)]
struct NumberNode {
    number: u64,
}

/// A GitHub.com or GitHub Enterprise Server instance.
#[derive(Debug)]
pub struct GitHubPlatform {
    client: ApiClient,
    api: Url,
}

impl GitHubPlatform {
    /// Wraps a rate-limited client.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidUrl`] if the instance's API URL cannot
    /// serve as a base for request paths.
    pub fn new(client: ApiClient) -> Result<Self, PlatformError> {
        let api_url = client.instance().api_url.clone();
        let api = Url::parse(&api_url).map_err(|e| PlatformError::InvalidUrl {
            url: api_url.clone(),
            message: e.to_string(),
        })?;
        if api.cannot_be_a_base() {
            return Err(PlatformError::InvalidUrl {
                url: api_url,
                message: "not a base URL".to_string(),
            });
        }
        Ok(Self { client, api })
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Builds `{api}/repos/{owner}/{name}/{segments...}`, percent-encoding
    /// each segment.
    fn repo_url<'a>(
        &self,
        repo: &'a Repository,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> String {
        let mut url = self.api.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
                .extend(segments);
        }
        url.to_string()
    }

    async fn lookup<T>(&self, url: &str, kind: &str) -> Result<Option<T>, PlatformError>
    where
        T: DeserializeOwned + Send,
    {
        let response = self.client.get(url).await?;
        if response.is_absent() {
            info!(url, kind, "No {kind} found");
            return Ok(None);
        }
        response.success()?.json().map(Some)
    }

    async fn list<T>(&self, url: &str) -> Result<Vec<T>, PlatformError>
    where
        T: DeserializeOwned + Send,
    {
        let values: Vec<Value> = drain(&self.client, with_page_size(url)).try_collect().await?;
        values
            .into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|source| PlatformError::Json {
                    url: url.to_string(),
                    source,
                })
            })
            .collect()
    }

    async fn mutate<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        kind: RequestKind,
    ) -> Result<crate::client::ApiResponse, PlatformError>
    where
        B: serde::Serialize + Sync + ?Sized,
    {
        self.client.request(method, url, body, kind).await?.success()
    }
}

#[async_trait]
impl Platform for GitHubPlatform {
    fn name(&self) -> &str {
        &self.client.instance().name
    }

    async fn latest_number(&self, repo: &Repository) -> Result<u64, PlatformError> {
        let variables = json!({ "owner": repo.owner, "name": repo.name });
        let data = self
            .client
            .graphql(LATEST_NUMBER_QUERY, &variables, RequestKind::Read)
            .await?;
        let parsed: LatestData =
            serde_json::from_value(data).map_err(|source| PlatformError::Json {
                url: self.client.instance().graphql_url.clone(),
                source,
            })?;

        let Some(repository) = parsed.repository else {
            return Err(PlatformError::GraphQl {
                url: self.client.instance().graphql_url.clone(),
                message: format!("repository {repo} not found"),
            });
        };

        let latest = repository
            .pull_requests
            .nodes
            .iter()
            .chain(&repository.issues.nodes)
            .map(|node| node.number)
            .max()
            .unwrap_or(0);
        debug!(%repo, latest, "Latest number");
        Ok(latest)
    }

    async fn pull_request(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Option<PullRequest>, PlatformError> {
        let number = number.to_string();
        let url = self.repo_url(repo, ["pulls", number.as_str()]);
        self.lookup(&url, "pull request").await
    }

    async fn issue(&self, repo: &Repository, number: u64) -> Result<Option<Issue>, PlatformError> {
        let number = number.to_string();
        let url = self.repo_url(repo, ["issues", number.as_str()]);
        self.lookup(&url, "issue").await
    }

    async fn number_exists(&self, repo: &Repository, number: u64) -> Result<bool, PlatformError> {
        let number = number.to_string();
        let url = self.repo_url(repo, ["issues", number.as_str()]);
        let response = self.client.get(&url).await?;
        match response.status {
            // A transferred issue still holds its number.
            200 | 301 => Ok(true),
            404 | 410 => Ok(false),
            _ => Err(response.into_error()),
        }
    }

    async fn open_pull_numbers(&self, repo: &Repository) -> Result<Vec<u64>, PlatformError> {
        let variables = json!({ "owner": repo.owner, "name": repo.name });
        let nodes: Vec<Value> =
            drain_connection(&self.client, OPEN_PULLS_QUERY, variables, OPEN_PULLS_PATH)
                .try_collect()
                .await?;

        nodes
            .into_iter()
            .map(|node| {
                serde_json::from_value::<NumberNode>(node)
                    .map(|node| node.number)
                    .map_err(|source| PlatformError::Json {
                        url: self.client.instance().graphql_url.clone(),
                        source,
                    })
            })
            .collect()
    }

    async fn issue_comments(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<Comment>, PlatformError> {
        let number = number.to_string();
        let url = self.repo_url(repo, ["issues", number.as_str(), "comments"]);
        self.list(&url).await
    }

    async fn review_comments(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<ReviewComment>, PlatformError> {
        let number = number.to_string();
        let url = self.repo_url(repo, ["pulls", number.as_str(), "comments"]);
        self.list(&url).await
    }

    async fn branch_exists(&self, repo: &Repository, branch: &str) -> Result<bool, PlatformError> {
        let url = self.repo_url(repo, std::iter::once("branches").chain(branch.split('/')));
        debug!(url, "Checking branch");
        let response = self.client.get(&url).await?;
        match response.status {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(response.into_error()),
        }
    }

    async fn create_branch(
        &self,
        repo: &Repository,
        branch: &str,
        sha: &str,
    ) -> Result<(), PlatformError> {
        let url = self.repo_url(repo, ["git", "refs"]);
        let body = json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
        self.mutate(Method::Post, &url, Some(&body), RequestKind::Create)
            .await
            .map(drop)
    }

    async fn delete_branch(&self, repo: &Repository, branch: &str) -> Result<(), PlatformError> {
        let url = self.repo_url(
            repo,
            ["git", "refs", "heads"].into_iter().chain(branch.split('/')),
        );
        self.mutate(Method::Delete, &url, None::<&()>, RequestKind::Update)
            .await
            .map(drop)
    }

    async fn commit_file(
        &self,
        repo: &Repository,
        commit: &FileCommit,
    ) -> Result<(), PlatformError> {
        let variables = json!({
            "input": {
                "branch": {
                    "repositoryNameWithOwner": repo.to_string(),
                    "branchName": commit.branch,
                },
                "fileChanges": {
                    "additions": [{
                        "path": commit.path,
                        "contents": BASE64_STANDARD.encode(commit.contents.as_bytes()),
                    }]
                },
                "message": { "headline": commit.headline, "body": commit.body },
                "expectedHeadOid": commit.expected_head_oid,
            }
        });
        let data = self
            .client
            .graphql(CREATE_COMMIT_MUTATION, &variables, RequestKind::Create)
            .await?;
        debug!(response = %data, "Commit created");
        Ok(())
    }

    async fn create_issue(&self, repo: &Repository, issue: &NewIssue) -> Result<u64, PlatformError> {
        let url = self.repo_url(repo, ["issues"]);
        let created: Created = self
            .mutate(Method::Post, &url, Some(issue), RequestKind::Create)
            .await?
            .json()?;
        Ok(created.number)
    }

    async fn create_pull(&self, repo: &Repository, pull: &NewPull) -> Result<u64, PlatformError> {
        let url = self.repo_url(repo, ["pulls"]);
        let created: Created = self
            .mutate(Method::Post, &url, Some(pull), RequestKind::Create)
            .await?
            .json()?;
        Ok(created.number)
    }

    async fn close(
        &self,
        repo: &Repository,
        number: u64,
        kind: ItemKind,
    ) -> Result<(), PlatformError> {
        let number = number.to_string();
        let collection = match kind {
            ItemKind::PullRequest => "pulls",
            ItemKind::Issue => "issues",
        };
        let url = self.repo_url(repo, [collection, number.as_str()]);
        let body = json!({ "state": "closed" });
        self.mutate(Method::Patch, &url, Some(&body), RequestKind::Update)
            .await
            .map(drop)
    }

    async fn add_labels(
        &self,
        repo: &Repository,
        number: u64,
        labels: &[String],
    ) -> Result<(), PlatformError> {
        let number = number.to_string();
        let url = self.repo_url(repo, ["issues", number.as_str(), "labels"]);
        let body = json!({ "labels": labels });
        self.mutate(Method::Post, &url, Some(&body), RequestKind::Update)
            .await
            .map(drop)
    }

    async fn create_issue_comment(
        &self,
        repo: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        let number = number.to_string();
        let url = self.repo_url(repo, ["issues", number.as_str(), "comments"]);
        let body = json!({ "body": body });
        self.mutate(Method::Post, &url, Some(&body), RequestKind::Create)
            .await
            .map(drop)
    }

    async fn create_review_comment(
        &self,
        repo: &Repository,
        number: u64,
        comment: &NewReviewComment,
    ) -> Result<(), PlatformError> {
        let number = number.to_string();
        let url = self.repo_url(repo, ["pulls", number.as_str(), "comments"]);
        self.mutate(Method::Post, &url, Some(comment), RequestKind::Create)
            .await
            .map(drop)
    }
}
