//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use pr_migrator::platform::{
    Comment, GitRef, Issue, ItemState, Label, MemoryPlatform, PullRequest, ReviewComment, User,
};
use pr_migrator::{Repository, RepositoryPair, RunnerConfig, Settings};
use std::sync::Arc;

pub const BASE_SHA: &str = "0123456789abcdef0123456789abcdef01234567";
pub const HEAD_SHA: &str = "89abcdef0123456789abcdef0123456789abcdef";

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn source_repo() -> Repository {
    Repository::new("acme", "widgets")
}

pub fn destination_repo() -> Repository {
    Repository::new("example-acme", "widgets")
}

pub fn pair() -> RepositoryPair {
    RepositoryPair {
        source: source_repo(),
        destination: destination_repo(),
    }
}

/// An open pull request by `alice` from `head` into `main`.
pub fn pull(number: u64, head: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("Pull request {number}"),
        body: Some(format!("Body of {number}")),
        user: User {
            login: "alice".to_string(),
        },
        state: ItemState::Open,
        html_url: format!("https://github.example.com/acme/widgets/pull/{number}"),
        labels: Vec::new(),
        comments: 0,
        review_comments: 0,
        locked: false,
        draft: false,
        milestone: None,
        head: GitRef {
            name: head.to_string(),
            sha: HEAD_SHA.to_string(),
        },
        base: GitRef {
            name: "main".to_string(),
            sha: BASE_SHA.to_string(),
        },
        merged_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// A closed pull request from `head` into `main`.
pub fn closed_pull(number: u64, head: &str) -> PullRequest {
    PullRequest {
        state: ItemState::Closed,
        ..pull(number, head)
    }
}

/// An open issue by `bob`.
pub fn issue(number: u64) -> Issue {
    Issue {
        number,
        title: format!("Issue {number}"),
        body: Some(format!("Issue body {number}")),
        user: User {
            login: "bob".to_string(),
        },
        state: ItemState::Open,
        html_url: format!("https://github.example.com/acme/widgets/issues/{number}"),
        labels: Vec::new(),
        comments: 0,
        locked: false,
        milestone: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// A closed issue.
pub fn closed_issue(number: u64) -> Issue {
    Issue {
        state: ItemState::Closed,
        ..issue(number)
    }
}

pub fn label(name: &str) -> Label {
    Label {
        name: name.to_string(),
    }
}

/// An issue comment by `carol` on `number`.
pub fn comment(number: u64, id: u64, body: &str) -> Comment {
    Comment {
        id,
        user: User {
            login: "carol".to_string(),
        },
        body: Some(body.to_string()),
        html_url: format!(
            "https://github.example.com/acme/widgets/issues/{number}#issuecomment-{id}"
        ),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// A review comment by `carol` on line 3 of `src/lib.rs`.
pub fn review_comment(number: u64, id: u64, body: &str) -> ReviewComment {
    ReviewComment {
        id,
        user: User {
            login: "carol".to_string(),
        },
        body: Some(body.to_string()),
        html_url: format!(
            "https://github.example.com/acme/widgets/pull/{number}#discussion_r{id}"
        ),
        path: "src/lib.rs".to_string(),
        commit_id: HEAD_SHA.to_string(),
        line: Some(3),
        side: Some("RIGHT".to_string()),
        start_line: None,
        start_side: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// Source and destination caught up to `caught_up`, with closed issues
/// under every number up to it on both sides.
pub fn platforms(caught_up: u64) -> (Arc<MemoryPlatform>, Arc<MemoryPlatform>) {
    let source = Arc::new(MemoryPlatform::new("github.example.com"));
    let destination = Arc::new(MemoryPlatform::new("github.com"));
    for number in 1..=caught_up {
        source.insert_issue(&source_repo(), closed_issue(number));
        destination.insert_issue(&destination_repo(), closed_issue(number));
    }
    (source, destination)
}

/// Source #10 open PR with a pushed branch, two comments and labels; #11
/// closed PR whose branch was never pushed; #12 open issue. The destination
/// is caught up to #9.
pub fn scenario() -> (Arc<MemoryPlatform>, Arc<MemoryPlatform>) {
    let (source, destination) = platforms(9);

    let mut open = pull(10, "feature/widgets");
    open.labels = vec![label("bug"), label("ui")];
    open.comments = 2;
    source.insert_pull(&source_repo(), open);
    source.insert_issue_comment(&source_repo(), 10, comment(10, 101, "Looks good"));
    source.insert_issue_comment(&source_repo(), 10, comment(10, 102, "Merging soon"));
    destination.insert_branch(&destination_repo(), "feature/widgets", HEAD_SHA);
    destination.insert_branch(&destination_repo(), "main", BASE_SHA);

    source.insert_pull(&source_repo(), closed_pull(11, "old-fix"));
    source.insert_issue(&source_repo(), issue(12));

    (source, destination)
}

/// Settings with pacing turned off.
pub fn settings() -> Settings {
    Settings {
        destination_org_prefix: "example-".to_string(),
        mutation_delay_secs: 0,
        creation_delay_secs: 0,
        ..Settings::default()
    }
}

pub fn config(dry_run: bool) -> RunnerConfig {
    RunnerConfig::new(settings(), "source-token".into(), "destination-token".into())
        .with_dry_run(dry_run)
}
