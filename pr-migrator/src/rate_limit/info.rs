//! Rate limit information.

use serde::Deserialize;
use std::time::Duration;

/// Maximum time to wait for a rate limit reset (1 hour).
pub const MAX_WAIT_SECS: u64 = 3600;

/// Rate limit information for the core API of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// How long to pause before the next request, if at all.
    ///
    /// Below `threshold` remaining requests the pause lasts until the reset
    /// plus `threshold` seconds of slack, capped at [`MAX_WAIT_SECS`] plus
    /// the slack.
    #[must_use]
    pub fn wait_duration(&self, threshold: u32, now: u64) -> Option<Duration> {
        if self.remaining >= threshold {
            return None;
        }

        let until_reset = self.reset.saturating_sub(now).min(MAX_WAIT_SECS);
        Some(Duration::from_secs(until_reset + u64::from(threshold)))
    }
}

/// Body of `GET /rate_limit`.
#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResponse {
    pub rate: RateLimitInfo,
}
