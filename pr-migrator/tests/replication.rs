mod common;

use common::*;
use pr_migrator::platform::ItemState;
use pr_migrator::{
    replication_range, ActionLog, ItemKind, MemoryOperation, MemoryPlatform, NumberedItem,
    PlannedAction, ReplicationCounts, ReplicationError, Replicator, TemplateRenderer, WalkOutcome,
};

async fn replay(
    source: &MemoryPlatform,
    destination: &MemoryPlatform,
    dry_run: bool,
) -> (Result<WalkOutcome, ReplicationError>, ActionLog, ReplicationCounts) {
    let renderer = TemplateRenderer::new().unwrap();
    let replicator = Replicator::new(source, destination, &renderer, "example");
    let mut log = ActionLog::new(dry_run);
    let mut counts = ReplicationCounts::default();
    let range = replication_range(9, 12);
    let result = replicator
        .replicate_range(&pair(), range, &mut log, &mut counts)
        .await;
    (result, log, counts)
}

#[tokio::test]
async fn replays_open_pull_closed_pull_and_issue_in_order() {
    let (source, destination) = scenario();
    let dst = destination_repo();

    let (result, _, counts) = replay(&source, &destination, false).await;

    assert_eq!(result.unwrap(), WalkOutcome::Completed);
    assert_eq!(
        destination.operations(),
        vec![
            MemoryOperation::CreatePull {
                repo: dst.clone(),
                number: 10,
                head: "feature/widgets".to_string(),
            },
            MemoryOperation::AddLabels {
                repo: dst.clone(),
                number: 10,
                labels: vec!["bug".to_string(), "ui".to_string()],
            },
            MemoryOperation::CreateIssueComment {
                repo: dst.clone(),
                number: 10,
            },
            MemoryOperation::CreateIssueComment {
                repo: dst.clone(),
                number: 10,
            },
            MemoryOperation::CreateBranch {
                repo: dst.clone(),
                branch: "old-fix".to_string(),
                sha: BASE_SHA.to_string(),
            },
            MemoryOperation::CommitFile {
                repo: dst.clone(),
                branch: "old-fix".to_string(),
                path: "placeholder-old-fix.md".to_string(),
            },
            MemoryOperation::CreatePull {
                repo: dst.clone(),
                number: 11,
                head: "old-fix".to_string(),
            },
            MemoryOperation::Close {
                repo: dst.clone(),
                number: 11,
                kind: ItemKind::PullRequest,
            },
            MemoryOperation::DeleteBranch {
                repo: dst.clone(),
                branch: "old-fix".to_string(),
            },
            MemoryOperation::CreateIssue {
                repo: dst.clone(),
                number: 12,
            },
        ]
    );

    assert_eq!(counts.pull_requests_created, 2);
    assert_eq!(counts.issues_created, 1);
    assert_eq!(counts.branches_synthesized, 1);
    assert_eq!(counts.objects_closed, 1);
    assert_eq!(counts.comments_copied, 2);
}

#[tokio::test]
async fn replayed_bodies_credit_the_original_author() {
    let (source, destination) = scenario();
    let dst = destination_repo();

    replay(&source, &destination, false).await.0.unwrap();

    let Some(NumberedItem::PullRequest(pull)) = destination.item(&dst, 10) else {
        panic!("#10 should be a pull request");
    };
    let body = pull.body.unwrap_or_default();
    assert!(body.contains(
        "Substitute PR for [#10](https://github.example.com/acme/widgets/pull/10) from @alice_example"
    ));
    assert!(body.ends_with("Body of 10"));

    let comments = destination.stored_issue_comments(&dst, 10);
    assert_eq!(comments.len(), 2);
    let first = comments[0].body.clone().unwrap_or_default();
    assert!(first.contains("#issuecomment-101) from @carol_example"));
    assert!(first.ends_with("Looks good"));

    let Some(NumberedItem::Issue(issue)) = destination.item(&dst, 12) else {
        panic!("#12 should be an issue");
    };
    assert!(issue
        .body
        .unwrap_or_default()
        .contains("Substitute issue for [#12]"));
}

#[tokio::test]
async fn closed_pull_without_branch_synthesizes_and_removes_it() {
    let (source, destination) = scenario();
    let dst = destination_repo();

    replay(&source, &destination, false).await.0.unwrap();

    let creations = destination
        .operations()
        .into_iter()
        .filter(|op| matches!(op, MemoryOperation::CreateBranch { .. }))
        .count();
    let commits = destination
        .operations()
        .into_iter()
        .filter(|op| matches!(op, MemoryOperation::CommitFile { .. }))
        .count();
    assert_eq!(creations, 1);
    assert_eq!(commits, 1);
    assert!(!destination.branches(&dst).contains(&"old-fix".to_string()));
    assert_eq!(
        destination.item(&dst, 11).and_then(|item| item.state()),
        Some(ItemState::Closed)
    );
}

#[tokio::test]
async fn open_pull_without_branch_creates_nothing_for_its_number() {
    let (source, destination) = platforms(9);
    source.insert_pull(&source_repo(), pull(10, "unpushed"));

    let (result, log, counts) = replay(&source, &destination, false).await;

    let Err(ReplicationError::UnexpectedState(message)) = result else {
        panic!("expected an unexpected state error");
    };
    assert!(message.contains("Push all branches"));
    assert!(log.actions().is_empty());
    assert_eq!(counts.objects_created(), 0);
    assert_eq!(destination.mutation_count(), 0);
    assert!(destination.item(&destination_repo(), 10).is_none());
}

#[tokio::test]
async fn dry_run_plans_the_same_actions_without_mutating() {
    let (live_source, live_destination) = scenario();
    let (live_result, live_log, live_counts) =
        replay(&live_source, &live_destination, false).await;

    let (dry_source, dry_destination) = scenario();
    let (dry_result, dry_log, dry_counts) = replay(&dry_source, &dry_destination, true).await;

    assert_eq!(live_result.unwrap(), dry_result.unwrap());
    assert_eq!(live_log.actions(), dry_log.actions());
    assert_eq!(live_counts, dry_counts);
    assert_eq!(dry_destination.mutation_count(), 0);
    assert!(live_destination.mutation_count() > 0);
}

#[tokio::test]
async fn dry_run_plans_enrichment_from_counts() {
    let (source, destination) = scenario();

    let (_, log, _) = replay(&source, &destination, true).await;

    assert!(log.actions().contains(&PlannedAction::CopyIssueComments {
        number: 10,
        count: 2
    }));
    assert!(log.actions().contains(&PlannedAction::DeleteBranch {
        branch: "old-fix".to_string()
    }));
}

#[tokio::test]
async fn existing_destination_number_stops_the_walk() {
    let (source, destination) = scenario();
    destination.insert_issue(&destination_repo(), closed_issue(10));

    let (result, log, counts) = replay(&source, &destination, false).await;

    assert_eq!(result.unwrap(), WalkOutcome::AlreadyExists { number: 10 });
    assert!(log.actions().is_empty());
    assert_eq!(counts.objects_created(), 0);
    assert_eq!(destination.mutation_count(), 0);
}

#[tokio::test]
async fn missing_source_number_stops_the_walk() {
    let (source, destination) = platforms(9);
    source.insert_issue(&source_repo(), issue(10));
    source.insert_issue(&source_repo(), issue(12));

    let (result, _, counts) = replay(&source, &destination, false).await;

    assert_eq!(result.unwrap(), WalkOutcome::SourceExhausted { number: 11 });
    assert_eq!(counts.issues_created, 1);
}

#[tokio::test]
async fn open_pull_review_comments_are_copied() {
    let (source, destination) = platforms(9);
    let mut open = pull(10, "feature/review");
    open.review_comments = 2;
    source.insert_pull(&source_repo(), open);
    source.insert_review_comment(&source_repo(), 10, review_comment(10, 1, "Nit"));
    let mut file_level = review_comment(10, 2, "Whole file");
    file_level.line = None;
    source.insert_review_comment(&source_repo(), 10, file_level);
    destination.insert_branch(&destination_repo(), "feature/review", HEAD_SHA);

    let renderer = TemplateRenderer::new().unwrap();
    let replicator = Replicator::new(source.as_ref(), destination.as_ref(), &renderer, "example");
    let mut log = ActionLog::new(false);
    let mut counts = ReplicationCounts::default();
    replicator
        .replicate_range(&pair(), 10..=10, &mut log, &mut counts)
        .await
        .unwrap();

    let copied = destination.stored_review_comments(&destination_repo(), 10);
    assert_eq!(copied.len(), 2);
    assert_eq!(copied[0].line, Some(3));
    assert_eq!(copied[0].path, "src/lib.rs");
    assert_eq!(copied[1].line, None);
    assert_eq!(counts.comments_copied, 2);
}

#[tokio::test]
async fn closed_issue_is_closed_after_creation() {
    let (source, destination) = platforms(9);
    source.insert_issue(&source_repo(), closed_issue(10));

    let renderer = TemplateRenderer::new().unwrap();
    let replicator = Replicator::new(source.as_ref(), destination.as_ref(), &renderer, "example");
    let mut log = ActionLog::new(false);
    let mut counts = ReplicationCounts::default();
    replicator
        .replicate_range(&pair(), 10..=10, &mut log, &mut counts)
        .await
        .unwrap();

    assert_eq!(
        log.actions(),
        &[
            PlannedAction::CreateIssue { number: 10 },
            PlannedAction::Close {
                number: 10,
                kind: ItemKind::Issue
            },
        ]
    );
    assert_eq!(
        destination
            .item(&destination_repo(), 10)
            .and_then(|item| item.state()),
        Some(ItemState::Closed)
    );
}
