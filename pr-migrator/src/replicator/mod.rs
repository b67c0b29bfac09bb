//! Ordered replay of pull requests and issues.
//!
//! The destination hands out numbers sequentially, so creating objects one by
//! one in source order makes every replayed object land on its original
//! number. The walk stops at the first number the destination already holds
//! and at the first gap in the source it cannot bridge.

mod action;
mod error;

pub use action::{ActionLog, PlannedAction};
pub use error::ReplicationError;

use crate::branches::ensure_branch;
use crate::classify::classify;
use crate::pairs::{Repository, RepositoryPair};
use crate::platform::{
    Issue, ItemKind, ItemState, NewIssue, NewPull, NewReviewComment, NumberedItem, Platform,
    PullRequest, ReviewComment,
};
use crate::templates::{gap_body, gap_title, suffixed_login, Attribution, TemplateRenderer};
use std::ops::RangeInclusive;
use tracing::{debug, info, info_span, warn, Instrument};

/// Objects created or changed on the destination.
///
/// Dry runs count what would have been done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicationCounts {
    pub pull_requests_created: usize,
    pub issues_created: usize,
    /// Closed issues filling numbers missing from the source.
    pub placeholders_created: usize,
    pub branches_synthesized: usize,
    pub objects_closed: usize,
    pub comments_copied: usize,
}

impl ReplicationCounts {
    /// Pull requests, issues and placeholder issues created.
    #[must_use]
    pub fn objects_created(&self) -> usize {
        self.pull_requests_created + self.issues_created + self.placeholders_created
    }

    /// Adds another set of counts to this one.
    pub fn add(&mut self, other: &Self) {
        self.pull_requests_created += other.pull_requests_created;
        self.issues_created += other.issues_created;
        self.placeholders_created += other.placeholders_created;
        self.branches_synthesized += other.branches_synthesized;
        self.objects_closed += other.objects_closed;
        self.comments_copied += other.comments_copied;
    }
}

/// Why a walk over a range ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Every number in the range was replayed.
    Completed,
    /// The destination already holds this number.
    AlreadyExists { number: u64 },
    /// The source has nothing under this number or shortly after it.
    SourceExhausted { number: u64 },
}

/// The numbers still to replay: one past the destination's latest number up
/// to the source's latest number. Empty when the destination is caught up.
#[must_use]
pub fn replication_range(destination_latest: u64, source_latest: u64) -> RangeInclusive<u64> {
    (destination_latest + 1)..=source_latest
}

enum Step {
    Next(u64),
    Stop(WalkOutcome),
}

/// Replays items from a source repository onto a destination repository.
#[derive(Clone, Copy)]
pub struct Replicator<'a> {
    source: &'a dyn Platform,
    destination: &'a dyn Platform,
    renderer: &'a TemplateRenderer,
    user_suffix: &'a str,
    absence_tolerance: u64,
}

impl<'a> Replicator<'a> {
    /// Creates a replicator.
    #[must_use]
    pub fn new(
        source: &'a dyn Platform,
        destination: &'a dyn Platform,
        renderer: &'a TemplateRenderer,
        user_suffix: &'a str,
    ) -> Self {
        Self {
            source,
            destination,
            renderer,
            user_suffix,
            absence_tolerance: 0,
        }
    }

    /// Sets how many numbers past a missing one are probed before the walk
    /// gives up. Zero stops at the first missing number.
    #[must_use]
    pub fn with_absence_tolerance(mut self, tolerance: u64) -> Self {
        self.absence_tolerance = tolerance;
        self
    }

    /// Replays every number in `range` in ascending order.
    ///
    /// Actions are planned through `log` and progress is added to `counts`
    /// as it happens, so both reflect partial work when an error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicationError`] on the first failure; nothing after the
    /// failing number is attempted.
    pub async fn replicate_range(
        &self,
        pair: &RepositoryPair,
        range: RangeInclusive<u64>,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<WalkOutcome, ReplicationError> {
        let (mut number, end) = range.into_inner();
        if number > end {
            info!(start = number, end, "Destination is up to date");
            return Ok(WalkOutcome::Completed);
        }
        info!(start = number, end, "Replaying numbers");

        while number <= end {
            let span = info_span!("number", number);
            let step = self
                .replicate_number(pair, number, end, log, counts)
                .instrument(span)
                .await?;
            match step {
                Step::Next(next) => number = next,
                Step::Stop(outcome) => return Ok(outcome),
            }
        }

        Ok(WalkOutcome::Completed)
    }

    async fn replicate_number(
        &self,
        pair: &RepositoryPair,
        number: u64,
        end: u64,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<Step, ReplicationError> {
        if self.destination.number_exists(&pair.destination, number).await? {
            warn!(
                repo = %pair.destination,
                "Number already exists on the destination, scanning will stop"
            );
            return Ok(Step::Stop(WalkOutcome::AlreadyExists { number }));
        }

        match classify(self.source, &pair.source, number).await? {
            NumberedItem::PullRequest(pull) => {
                self.replicate_pull(pair, number, &pull, log, counts)
                    .await?;
            }
            NumberedItem::Issue(issue) => {
                self.replicate_issue(pair, number, &issue, log, counts)
                    .await?;
            }
            NumberedItem::Absent => {
                let Some(next) = self.next_present(&pair.source, number, end).await? else {
                    warn!(repo = %pair.source, "Number is not available, scanning will stop");
                    return Ok(Step::Stop(WalkOutcome::SourceExhausted { number }));
                };
                for missing in number..next {
                    if missing > number
                        && self
                            .destination
                            .number_exists(&pair.destination, missing)
                            .await?
                    {
                        warn!(
                            repo = %pair.destination,
                            missing,
                            "Number already exists on the destination, scanning will stop"
                        );
                        return Ok(Step::Stop(WalkOutcome::AlreadyExists { number: missing }));
                    }
                    self.fill_gap(pair, missing, log, counts).await?;
                }
                return Ok(Step::Next(next));
            }
        }

        Ok(Step::Next(number + 1))
    }

    /// Finds the first present source number after `number`, looking at most
    /// `absence_tolerance` numbers ahead and never past `end`.
    async fn next_present(
        &self,
        repo: &Repository,
        number: u64,
        end: u64,
    ) -> Result<Option<u64>, ReplicationError> {
        let last = number.saturating_add(self.absence_tolerance).min(end);
        for candidate in (number + 1)..=last {
            if self.source.number_exists(repo, candidate).await? {
                info!(missing = number, next = candidate, "Found a later number past the gap");
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Takes a missing source number with a closed placeholder issue.
    async fn fill_gap(
        &self,
        pair: &RepositoryPair,
        number: u64,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<(), ReplicationError> {
        let payload = NewIssue {
            title: gap_title(number),
            body: gap_body(number, &pair.source.to_string()),
            milestone: None,
        };
        info!(number, "Filling missing number with a placeholder issue");
        self.create_issue(pair, number, &payload, log).await?;
        counts.placeholders_created += 1;
        self.close(pair, number, ItemKind::Issue, log, counts).await
    }

    /// Replays `pull` under the walked `number`. A record reached through a
    /// redirect may carry another number; the walked one is what the
    /// destination must assign.
    async fn replicate_pull(
        &self,
        pair: &RepositoryPair,
        number: u64,
        pull: &PullRequest,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<(), ReplicationError> {
        let state = pull.effective_state();
        info!(title = %pull.title, %state, head = %pull.head.name, "Replaying pull request");

        let branch = ensure_branch(self.destination, &pair.destination, pull, self.renderer, log)
            .await?;
        if !branch.existed {
            counts.branches_synthesized += 1;
        }

        let author = suffixed_login(&pull.user.login, self.user_suffix);
        let body = self.renderer.render_item_body(
            ItemKind::PullRequest,
            &Attribution {
                number,
                html_url: &pull.html_url,
                author: &author,
                body: pull.body.as_deref().unwrap_or_default(),
            },
        )?;
        let payload = NewPull {
            title: pull.title.clone(),
            body,
            head: pull.head.name.clone(),
            base: pull.base.name.clone(),
            draft: pull.draft,
            locked: pull.locked,
            number,
        };
        debug!(?payload, "Pull request payload");

        let execute = log.plan(PlannedAction::CreatePull {
            number,
            head: payload.head.clone(),
            base: payload.base.clone(),
        });
        let created = if execute {
            self.destination
                .create_pull(&pair.destination, &payload)
                .await?
        } else {
            number
        };
        verify(number, created)?;
        counts.pull_requests_created += 1;
        info!(created, "Pull request created");

        if state == ItemState::Open {
            let labels = label_names(&pull.labels);
            self.add_labels(pair, number, labels, log).await?;
            self.copy_issue_comments(pair, number, pull.comments, log, counts)
                .await?;
            self.copy_review_comments(pair, number, pull.review_comments, log, counts)
                .await?;
        } else {
            self.close(pair, number, ItemKind::PullRequest, log, counts)
                .await?;
            if !branch.existed {
                self.delete_branch(pair, &pull.head.name, log).await?;
            }
        }

        Ok(())
    }

    async fn replicate_issue(
        &self,
        pair: &RepositoryPair,
        number: u64,
        issue: &Issue,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<(), ReplicationError> {
        if issue.number != number {
            info!(
                fetched = issue.number,
                "Source issue was moved, replaying it under the walked number"
            );
        }
        info!(title = %issue.title, state = %issue.state, "Replaying issue");

        let author = suffixed_login(&issue.user.login, self.user_suffix);
        let body = self.renderer.render_item_body(
            ItemKind::Issue,
            &Attribution {
                number,
                html_url: &issue.html_url,
                author: &author,
                body: issue.body.as_deref().unwrap_or_default(),
            },
        )?;
        let payload = NewIssue {
            title: issue.title.clone(),
            body,
            milestone: issue.milestone.as_ref().map(|m| m.number),
        };

        self.create_issue(pair, number, &payload, log).await?;
        counts.issues_created += 1;

        if issue.state == ItemState::Open {
            let labels = label_names(&issue.labels);
            self.add_labels(pair, number, labels, log).await?;
            self.copy_issue_comments(pair, number, issue.comments, log, counts)
                .await?;
        } else {
            self.close(pair, number, ItemKind::Issue, log, counts)
                .await?;
        }

        Ok(())
    }

    async fn create_issue(
        &self,
        pair: &RepositoryPair,
        number: u64,
        payload: &NewIssue,
        log: &mut ActionLog,
    ) -> Result<(), ReplicationError> {
        debug!(?payload, "Issue payload");
        let created = if log.plan(PlannedAction::CreateIssue { number }) {
            self.destination
                .create_issue(&pair.destination, payload)
                .await?
        } else {
            number
        };
        verify(number, created)?;
        info!(created, "Issue created");
        Ok(())
    }

    async fn add_labels(
        &self,
        pair: &RepositoryPair,
        number: u64,
        labels: Vec<String>,
        log: &mut ActionLog,
    ) -> Result<(), ReplicationError> {
        if labels.is_empty() {
            return Ok(());
        }
        if log.plan(PlannedAction::AddLabels {
            number,
            labels: labels.clone(),
        }) {
            self.destination
                .add_labels(&pair.destination, number, &labels)
                .await?;
        }
        Ok(())
    }

    async fn copy_issue_comments(
        &self,
        pair: &RepositoryPair,
        number: u64,
        count: u64,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<(), ReplicationError> {
        if count == 0 {
            return Ok(());
        }
        if !log.plan(PlannedAction::CopyIssueComments { number, count }) {
            counts.comments_copied += usize::try_from(count).unwrap_or(usize::MAX);
            return Ok(());
        }

        let comments = self.source.issue_comments(&pair.source, number).await?;
        for comment in &comments {
            let author = suffixed_login(&comment.user.login, self.user_suffix);
            let body = self.renderer.render_comment_body(&Attribution {
                number,
                html_url: &comment.html_url,
                author: &author,
                body: comment.body.as_deref().unwrap_or_default(),
            })?;
            self.destination
                .create_issue_comment(&pair.destination, number, &body)
                .await?;
            counts.comments_copied += 1;
        }
        info!(copied = comments.len(), "Copied comments");
        Ok(())
    }

    async fn copy_review_comments(
        &self,
        pair: &RepositoryPair,
        number: u64,
        count: u64,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<(), ReplicationError> {
        if count == 0 {
            return Ok(());
        }
        if !log.plan(PlannedAction::CopyReviewComments { number, count }) {
            counts.comments_copied += usize::try_from(count).unwrap_or(usize::MAX);
            return Ok(());
        }

        let comments = self.source.review_comments(&pair.source, number).await?;
        for comment in &comments {
            let author = suffixed_login(&comment.user.login, self.user_suffix);
            let body = self.renderer.render_comment_body(&Attribution {
                number,
                html_url: &comment.html_url,
                author: &author,
                body: comment.body.as_deref().unwrap_or_default(),
            })?;
            self.destination
                .create_review_comment(&pair.destination, number, &review_payload(comment, body))
                .await?;
            counts.comments_copied += 1;
        }
        info!(copied = comments.len(), "Copied review comments");
        Ok(())
    }

    async fn close(
        &self,
        pair: &RepositoryPair,
        number: u64,
        kind: ItemKind,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<(), ReplicationError> {
        if log.plan(PlannedAction::Close { number, kind }) {
            self.destination
                .close(&pair.destination, number, kind)
                .await?;
        }
        counts.objects_closed += 1;
        Ok(())
    }

    async fn delete_branch(
        &self,
        pair: &RepositoryPair,
        branch: &str,
        log: &mut ActionLog,
    ) -> Result<(), ReplicationError> {
        if log.plan(PlannedAction::DeleteBranch {
            branch: branch.to_string(),
        }) {
            self.destination
                .delete_branch(&pair.destination, branch)
                .await?;
        }
        Ok(())
    }
}

/// Checks that the destination assigned the expected number.
fn verify(expected: u64, created: u64) -> Result<(), ReplicationError> {
    if created == expected {
        Ok(())
    } else {
        Err(ReplicationError::UnexpectedState(format!(
            "New number {created} does not match expected number {expected}, \
             the destination sequence is no longer aligned"
        )))
    }
}

fn label_names(labels: &[crate::platform::Label]) -> Vec<String> {
    labels.iter().map(|label| label.name.clone()).collect()
}

/// Builds the destination payload of a review comment.
///
/// Comments without a line are posted against the whole file.
fn review_payload(comment: &ReviewComment, body: String) -> NewReviewComment {
    let anchored = comment.line.is_some();
    NewReviewComment {
        body,
        commit_id: comment.commit_id.clone(),
        path: comment.path.clone(),
        line: comment.line,
        side: comment.side.clone().filter(|_| anchored),
        start_line: comment.start_line.filter(|_| anchored),
        start_side: comment.start_side.clone().filter(|_| anchored),
        subject_type: (!anchored).then(|| "file".to_string()),
    }
}
