//! Closing destination pull requests that were closed on the source.

use crate::pairs::RepositoryPair;
use crate::platform::{ItemKind, ItemState, Platform};
use crate::replicator::{ActionLog, PlannedAction, ReplicationCounts, ReplicationError};
use tracing::{debug, info, warn};

/// Closes every open destination pull request whose original is no longer
/// open on the source.
///
/// # Errors
///
/// Returns [`ReplicationError::Platform`] if a request fails.
pub async fn reconcile_closed_pulls(
    source: &dyn Platform,
    destination: &dyn Platform,
    pair: &RepositoryPair,
    log: &mut ActionLog,
    counts: &mut ReplicationCounts,
) -> Result<(), ReplicationError> {
    let open = destination.open_pull_numbers(&pair.destination).await?;
    info!(
        count = open.len(),
        repo = %pair.destination,
        "Checking open pull requests against the source"
    );

    for number in open {
        let Some(pull) = source.pull_request(&pair.source, number).await? else {
            warn!(
                number,
                repo = %pair.source,
                "Expected pull request on the source but it isn't there (it could be an issue)"
            );
            continue;
        };

        let state = pull.effective_state();
        if state == ItemState::Open {
            debug!(number, "Pull request is still open on the source");
            continue;
        }

        info!(number, %state, "Pull request is no longer open on the source, closing it");
        if log.plan(PlannedAction::Close {
            number,
            kind: ItemKind::PullRequest,
        }) {
            destination
                .close(&pair.destination, number, ItemKind::PullRequest)
                .await?;
        }
        counts.objects_closed += 1;
    }

    Ok(())
}
