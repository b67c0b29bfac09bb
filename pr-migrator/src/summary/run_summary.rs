//! Run summary types.

use super::result::PairOutcome;
use crate::replicator::ReplicationCounts;

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of input lines turned into outcomes.
    pub pairs_processed: usize,

    /// Objects created or changed across all pairs.
    pub counts: ReplicationCounts,

    /// Pairs that failed, as `source -> destination` or `line N`.
    pub failed_pairs: Vec<String>,

    /// Whether a failure stopped the remaining pairs from being processed.
    pub aborted: bool,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Whether open destination pull requests were reconciled.
    pub check_closed_prs: bool,

    /// Outcome of every processed pair, in input order.
    pub outcomes: Vec<PairOutcome>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool, check_closed_prs: bool) -> Self {
        Self {
            dry_run,
            check_closed_prs,
            ..Default::default()
        }
    }

    /// Updates the summary with the outcome of one pair.
    pub fn record_outcome(&mut self, outcome: PairOutcome) {
        self.pairs_processed += 1;
        self.counts.add(&outcome.counts());
        match &outcome {
            PairOutcome::Replicated { .. } => {}
            PairOutcome::Failed { pair, .. } => self.failed_pairs.push(pair.to_string()),
            PairOutcome::Invalid { line, .. } => self.failed_pairs.push(format!("line {line}")),
        }
        self.outcomes.push(outcome);
    }

    /// Pull requests, issues and placeholders created, or that would have
    /// been created in a dry run.
    #[must_use]
    pub fn objects_created(&self) -> usize {
        self.counts.objects_created()
    }

    /// Returns true if any pair failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed_pairs.is_empty()
    }

    /// Returns true if every pair succeeded.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures() && !self.aborted
    }
}
