//! Rate limiting and request pacing for GitHub API instances.
//!
//! Requests wait when an instance's remaining quota falls below a threshold,
//! and mutating requests are spaced out per GitHub's secondary rate limit
//! guidance.

mod info;

pub use info::{RateLimitInfo, MAX_WAIT_SECS};
pub(crate) use info::RateLimitResponse;

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;

/// Default remaining-quota threshold.
pub const DEFAULT_THRESHOLD: u32 = 120;

/// What a request does, which decides how long it is paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Lookups and listings.
    Read,
    /// Updates and deletions.
    Update,
    /// Requests creating pull requests, issues, branches, commits or comments.
    Create,
}

/// Pacing policy for one API instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    /// Remaining requests below which the client waits for the reset.
    pub threshold: u32,
    /// Pause before every mutating request.
    pub mutation_delay: Duration,
    /// Pause before creating requests.
    pub creation_delay: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            mutation_delay: Duration::from_secs(1),
            creation_delay: Duration::from_secs(5),
        }
    }
}

impl Throttle {
    /// A throttle that never pauses between requests.
    #[must_use]
    pub fn unpaced(threshold: u32) -> Self {
        Self {
            threshold,
            mutation_delay: Duration::ZERO,
            creation_delay: Duration::ZERO,
        }
    }

    /// Pause owed before a request of the given kind.
    #[must_use]
    pub fn pause_for(&self, kind: RequestKind) -> Duration {
        match kind {
            RequestKind::Read => Duration::ZERO,
            RequestKind::Update => self.mutation_delay,
            RequestKind::Create => self.creation_delay.max(self.mutation_delay),
        }
    }
}

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Waits if the rate limit is low, returning true if we waited.
pub async fn wait_if_needed(instance: &str, info: &RateLimitInfo, threshold: u32) -> bool {
    let Some(wait) = info.wait_duration(threshold, unix_now()) else {
        return false;
    };

    info!(
        instance,
        remaining = info.remaining,
        threshold,
        wait_secs = wait.as_secs(),
        "Remaining rate limit is below threshold, sleeping"
    );
    tokio::time::sleep(wait).await;
    true
}
