//! Runner configuration.

use crate::config::Settings;
use crate::rate_limit::Throttle;

/// Configuration for one migration run.
#[derive(Clone)]
pub struct RunnerConfig {
    /// Settings loaded from the optional settings file.
    settings: Settings,
    /// Token for the source instance.
    source_token: String,
    /// Token for the destination instance.
    destination_token: String,
    /// Whether to log planned mutations instead of performing them.
    dry_run: bool,
    /// Whether to close destination pull requests closed on the source.
    check_closed_prs: bool,
    /// Whether a failed pair lets the following pairs proceed.
    keep_going: bool,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(settings: Settings, source_token: String, destination_token: String) -> Self {
        Self {
            settings,
            source_token,
            destination_token,
            dry_run: false,
            check_closed_prs: false,
            keep_going: false,
        }
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enables or disables the closed pull request reconciliation pass.
    #[must_use]
    pub fn with_check_closed_prs(mut self, check_closed_prs: bool) -> Self {
        self.check_closed_prs = check_closed_prs;
        self
    }

    /// Enables or disables per-pair failure isolation.
    #[must_use]
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Returns the loaded settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the source token.
    pub fn source_token(&self) -> &str {
        &self.source_token
    }

    /// Returns the destination token.
    pub fn destination_token(&self) -> &str {
        &self.destination_token
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns whether closed pull requests are reconciled.
    pub fn check_closed_prs(&self) -> bool {
        self.check_closed_prs
    }

    /// Returns whether failed pairs are isolated.
    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    /// Request pacing derived from the settings.
    pub fn throttle(&self) -> Throttle {
        Throttle {
            threshold: self.settings.rate_limit_threshold,
            mutation_delay: self.settings.mutation_delay(),
            creation_delay: self.settings.creation_delay(),
        }
    }
}

impl std::fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("settings", &self.settings)
            .field("dry_run", &self.dry_run)
            .field("check_closed_prs", &self.check_closed_prs)
            .field("keep_going", &self.keep_going)
            .finish_non_exhaustive()
    }
}
