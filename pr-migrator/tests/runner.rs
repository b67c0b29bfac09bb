mod common;

use common::*;
use pr_migrator::platform::ItemState;
use pr_migrator::{
    ItemKind, PairOutcome, PlannedAction, Repository, Runner, RunnerConfig, WalkOutcome,
};
use std::sync::Arc;

const WIDGETS: &str = "acme/widgets,example-acme/widgets";

fn runner(
    config: RunnerConfig,
    source: &Arc<pr_migrator::MemoryPlatform>,
    destination: &Arc<pr_migrator::MemoryPlatform>,
) -> Runner {
    Runner::with_platforms(config, source.clone(), destination.clone()).unwrap()
}

#[tokio::test]
async fn run_replays_scenario_and_reports_counts() {
    let (source, destination) = scenario();

    let summary = runner(config(false), &source, &destination)
        .run(WIDGETS)
        .await;

    assert!(summary.all_success());
    assert_eq!(summary.pairs_processed, 1);
    assert_eq!(summary.objects_created(), 3);
    assert_eq!(summary.counts.branches_synthesized, 1);
    assert!(matches!(
        summary.outcomes[0],
        PairOutcome::Replicated {
            walk: WalkOutcome::Completed,
            ..
        }
    ));
}

#[tokio::test]
async fn destination_only_line_infers_source_org() {
    let (source, destination) = scenario();

    let summary = runner(config(false), &source, &destination)
        .run("example-acme/widgets\n")
        .await;

    assert!(summary.all_success());
    assert_eq!(summary.objects_created(), 3);
}

#[tokio::test]
async fn second_run_creates_nothing() {
    let (source, destination) = scenario();
    let runner = runner(config(false), &source, &destination);

    let first = runner.run(WIDGETS).await;
    let mutations = destination.mutation_count();
    let second = runner.run(WIDGETS).await;

    assert_eq!(first.objects_created(), 3);
    assert!(second.all_success());
    assert_eq!(second.objects_created(), 0);
    assert_eq!(destination.mutation_count(), mutations);
}

#[tokio::test]
async fn dry_run_reports_would_be_creations_without_mutating() {
    let (source, destination) = scenario();

    let summary = runner(config(true), &source, &destination)
        .run(WIDGETS)
        .await;

    assert!(summary.dry_run);
    assert!(summary.all_success());
    assert_eq!(summary.objects_created(), 3);
    assert_eq!(destination.mutation_count(), 0);
    assert_eq!(source.mutation_count(), 0);
}

#[tokio::test]
async fn destination_holding_ten_resumes_at_eleven() {
    let (source, destination) = scenario();
    destination.insert_issue(&destination_repo(), closed_issue(10));

    let summary = runner(config(false), &source, &destination)
        .run(WIDGETS)
        .await;

    // Latest destination number is now 10, so the walk starts at 11.
    assert!(summary.all_success());
    assert_eq!(summary.objects_created(), 2);
    assert!(destination
        .operations()
        .iter()
        .all(|op| !matches!(op, pr_migrator::MemoryOperation::CreatePull { number: 10, .. })));
}

#[tokio::test]
async fn open_pull_without_branch_fails_the_pair() {
    let (source, destination) = platforms(9);
    source.insert_pull(&source_repo(), pull(10, "unpushed"));

    let summary = runner(config(false), &source, &destination)
        .run(WIDGETS)
        .await;

    assert!(!summary.all_success());
    assert_eq!(summary.objects_created(), 0);
    assert_eq!(summary.failed_pairs, vec!["acme/widgets -> example-acme/widgets"]);
    let PairOutcome::Failed { error, .. } = &summary.outcomes[0] else {
        panic!("expected a failed pair");
    };
    assert!(error.contains("Push all branches"));
    assert_eq!(destination.mutation_count(), 0);
}

fn broken_pair_input() -> String {
    format!("acme/broken,example-acme/broken\n{WIDGETS}\n")
}

fn with_broken_pair() -> (
    Arc<pr_migrator::MemoryPlatform>,
    Arc<pr_migrator::MemoryPlatform>,
) {
    let (source, destination) = scenario();
    source.insert_pull(&Repository::new("acme", "broken"), pull(1, "unpushed"));
    (source, destination)
}

#[tokio::test]
async fn failure_aborts_remaining_pairs_by_default() {
    let (source, destination) = with_broken_pair();

    let summary = runner(config(false), &source, &destination)
        .run(&broken_pair_input())
        .await;

    assert!(summary.aborted);
    assert!(!summary.all_success());
    assert_eq!(summary.pairs_processed, 1);
    assert_eq!(summary.objects_created(), 0);
    assert_eq!(destination.mutation_count(), 0);
}

#[tokio::test]
async fn keep_going_processes_remaining_pairs() {
    let (source, destination) = with_broken_pair();

    let summary = runner(config(false).with_keep_going(true), &source, &destination)
        .run(&broken_pair_input())
        .await;

    assert!(!summary.aborted);
    assert!(!summary.all_success());
    assert_eq!(summary.pairs_processed, 2);
    assert_eq!(summary.failed_pairs, vec!["acme/broken -> example-acme/broken"]);
    assert_eq!(summary.objects_created(), 3);
}

#[tokio::test]
async fn comments_and_blank_lines_are_skipped_and_bad_lines_reported() {
    let (source, destination) = scenario();
    let input = format!("# pairs to migrate\n\nnot-a-pair\n{WIDGETS}\n");

    let summary = runner(config(false).with_keep_going(true), &source, &destination)
        .run(&input)
        .await;

    assert_eq!(summary.pairs_processed, 2);
    assert_eq!(summary.failed_pairs, vec!["line 3"]);
    assert!(matches!(
        summary.outcomes[0],
        PairOutcome::Invalid { line: 3, .. }
    ));
    assert_eq!(summary.objects_created(), 3);
}

#[tokio::test]
async fn destination_only_line_without_prefix_is_invalid() {
    let (source, destination) = scenario();

    let summary = runner(config(false), &source, &destination)
        .run("acme/widgets")
        .await;

    assert!(summary.aborted);
    assert!(matches!(summary.outcomes[0], PairOutcome::Invalid { .. }));
    assert_eq!(destination.mutation_count(), 0);
}

#[tokio::test]
async fn closed_source_pulls_are_closed_on_destination() {
    let (source, destination) = platforms(4);
    let mut merged = closed_pull(5, "merged");
    merged.merged_at = Some(timestamp());
    source.insert_pull(&source_repo(), merged);
    source.insert_pull(&source_repo(), pull(6, "still-open"));
    source.insert_issue(&source_repo(), issue(7));
    destination.insert_pull(&destination_repo(), pull(5, "merged"));
    destination.insert_pull(&destination_repo(), pull(6, "still-open"));
    destination.insert_pull(&destination_repo(), pull(7, "was-an-issue"));

    let summary = runner(
        config(false).with_check_closed_prs(true),
        &source,
        &destination,
    )
    .run(WIDGETS)
    .await;

    assert!(summary.all_success());
    assert!(summary.check_closed_prs);
    assert_eq!(summary.counts.objects_closed, 1);
    assert_eq!(summary.objects_created(), 0);
    assert_eq!(
        summary.outcomes[0].actions(),
        &[PlannedAction::Close {
            number: 5,
            kind: ItemKind::PullRequest
        }]
    );
    assert_eq!(
        destination
            .item(&destination_repo(), 5)
            .and_then(|item| item.state()),
        Some(ItemState::Closed)
    );
    assert_eq!(
        destination
            .item(&destination_repo(), 6)
            .and_then(|item| item.state()),
        Some(ItemState::Open)
    );
}

#[tokio::test]
async fn reconciliation_is_skipped_unless_enabled() {
    let (source, destination) = platforms(4);
    source.insert_pull(&source_repo(), closed_pull(5, "done"));
    destination.insert_pull(&destination_repo(), pull(5, "done"));

    let summary = runner(config(false), &source, &destination)
        .run(WIDGETS)
        .await;

    assert!(summary.all_success());
    assert_eq!(summary.counts.objects_closed, 0);
    assert_eq!(destination.mutation_count(), 0);
}

#[tokio::test]
async fn absence_tolerance_from_settings_fills_gaps() {
    let (source, destination) = platforms(9);
    source.insert_issue(&source_repo(), issue(12));
    let mut settings = settings();
    settings.absence_tolerance = 3;
    let config = RunnerConfig::new(settings, "s".into(), "d".into());

    let summary = runner(config, &source, &destination).run(WIDGETS).await;

    assert!(summary.all_success());
    assert_eq!(summary.counts.placeholders_created, 2);
    assert_eq!(summary.counts.issues_created, 1);
    assert_eq!(summary.counts.objects_closed, 2);
    assert_eq!(
        destination
            .item(&destination_repo(), 11)
            .and_then(|item| item.state()),
        Some(ItemState::Closed)
    );
}
