//! Per-pair results.

use crate::pairs::RepositoryPair;
use crate::replicator::{PlannedAction, ReplicationCounts, WalkOutcome};

/// Work done for a single input line.
#[derive(Debug, Clone)]
pub enum PairOutcome {
    /// The pair was replayed up to where the walk ended.
    Replicated {
        /// Repositories replayed.
        pair: RepositoryPair,
        /// Why the walk ended.
        walk: WalkOutcome,
        /// Objects created or changed.
        counts: ReplicationCounts,
        /// Destination mutations in planned order.
        actions: Vec<PlannedAction>,
    },

    /// Replay stopped with an error after partial work.
    Failed {
        /// Repositories replayed.
        pair: RepositoryPair,
        /// Objects created or changed before the failure.
        counts: ReplicationCounts,
        /// Destination mutations planned before the failure.
        actions: Vec<PlannedAction>,
        /// Error message with its source chain.
        error: String,
    },

    /// The input line could not be parsed.
    Invalid {
        /// One-based line number.
        line: usize,
        /// Parse error message.
        error: String,
    },
}

impl PairOutcome {
    /// Returns true unless the pair failed or could not be parsed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Replicated { .. })
    }

    /// Counts of the pair, zero for unparsable lines.
    #[must_use]
    pub fn counts(&self) -> ReplicationCounts {
        match self {
            Self::Replicated { counts, .. } | Self::Failed { counts, .. } => *counts,
            Self::Invalid { .. } => ReplicationCounts::default(),
        }
    }

    /// Planned actions of the pair, empty for unparsable lines.
    #[must_use]
    pub fn actions(&self) -> &[PlannedAction] {
        match self {
            Self::Replicated { actions, .. } | Self::Failed { actions, .. } => actions,
            Self::Invalid { .. } => &[],
        }
    }
}
