//! Fixtures shared by unit tests.

use crate::platform::{GitRef, Issue, ItemState, Label, PullRequest, ReviewComment, User};
use chrono::{TimeZone, Utc};

pub(crate) const BASE_SHA: &str = "0123456789abcdef0123456789abcdef01234567";
pub(crate) const HEAD_SHA: &str = "89abcdef0123456789abcdef0123456789abcdef";

fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// An open pull request by `alice` from `head` into `main`.
pub(crate) fn pull(number: u64, head: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("Pull request {number}"),
        body: Some(format!("Body of {number}")),
        user: User {
            login: "alice".to_string(),
        },
        state: ItemState::Open,
        html_url: format!("https://github.example.com/org/repo/pull/{number}"),
        labels: vec![Label {
            name: "bug".to_string(),
        }],
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

/// An open issue by `bob`.
pub(crate) fn issue(number: u64) -> Issue {
    Issue {
        number,
        title: format!("Issue {number}"),
        body: None,
        user: User {
            login: "bob".to_string(),
        },
        state: ItemState::Open,
        html_url: format!("https://github.example.com/org/repo/issues/{number}"),
        labels: Vec::new(),
        comments: 0,
        locked: false,
        milestone: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// A review comment by `carol` on line 3 of `src/lib.rs`.
pub(crate) fn review_comment(id: u64, body: &str) -> ReviewComment {
    ReviewComment {
        id,
        user: User {
            login: "carol".to_string(),
        },
        body: Some(body.to_string()),
        html_url: format!("https://github.example.com/org/repo/pull/1#discussion_r{id}"),
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
