//! Orchestrates a migration run over a list of repository pairs.

mod config;
mod error;
mod reconcile;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use reconcile::reconcile_closed_pulls;

use crate::client::ApiClient;
use crate::config::InstanceSettings;
use crate::pairs::{is_comment, parse_pair, RepositoryPair};
use crate::platform::{GitHubPlatform, Platform};
use crate::rate_limit::Throttle;
use crate::replicator::{
    replication_range, ActionLog, ReplicationCounts, ReplicationError, Replicator, WalkOutcome,
};
use crate::summary::{PairOutcome, RunSummary};
use crate::templates::TemplateRenderer;
use std::error::Error as _;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

/// Replays pull requests and issues for every pair of a run.
pub struct Runner {
    config: RunnerConfig,
    source: Arc<dyn Platform>,
    destination: Arc<dyn Platform>,
    renderer: TemplateRenderer,
}

impl Runner {
    /// Builds a runner talking to the instances named in the settings.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if an instance URL is unusable, a client
    /// cannot be built or a template override does not compile.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let throttle = config.throttle();
        let settings = config.settings();
        let source = connect(
            "source",
            &settings.source,
            config.source_token(),
            throttle,
        )?;
        let destination = connect(
            "destination",
            &settings.destination,
            config.destination_token(),
            throttle,
        )?;
        Self::with_platforms(config, Arc::new(source), Arc::new(destination))
    }

    /// Builds a runner over already constructed platforms.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if a template override does not
    /// compile.
    pub fn with_platforms(
        config: RunnerConfig,
        source: Arc<dyn Platform>,
        destination: Arc<dyn Platform>,
    ) -> Result<Self, RunnerError> {
        let renderer = TemplateRenderer::with_overrides(&config.settings().templates)?;
        Ok(Self {
            config,
            source,
            destination,
            renderer,
        })
    }

    /// Processes every pair in `input`, one line per pair.
    ///
    /// Without `keep_going`, the first failed pair aborts the rest of the
    /// run. The final summary line is always logged.
    pub async fn run(&self, input: &str) -> RunSummary {
        let dry_run = self.config.dry_run();
        let mut summary = RunSummary::new(dry_run, self.config.check_closed_prs());

        if dry_run {
            info!("Dry run: simulating PR migration");
        } else {
            info!("Starting PR migration");
        }

        let prefix = &self.config.settings().destination_org_prefix;
        for (index, line) in input.lines().enumerate() {
            if is_comment(line) {
                continue;
            }

            let outcome = match parse_pair(line, prefix) {
                Ok(pair) => {
                    let span = info_span!(
                        "pair",
                        source = %pair.source,
                        destination = %pair.destination
                    );
                    self.process_pair(pair).instrument(span).await
                }
                Err(e) => {
                    error!(line = index + 1, error = %e, "Invalid input line");
                    PairOutcome::Invalid {
                        line: index + 1,
                        error: e.to_string(),
                    }
                }
            };

            let failed = !outcome.is_success();
            summary.record_outcome(outcome);
            if failed && !self.config.keep_going() {
                error!("Aborting the remaining pairs");
                summary.aborted = true;
                break;
            }
        }

        if dry_run {
            info!(
                "Dry run: Finished with PR migration, {} objects would have been created if run for real",
                summary.objects_created()
            );
        } else {
            info!(
                "Finished with PR migration, {} objects created",
                summary.objects_created()
            );
        }

        summary
    }

    async fn process_pair(&self, pair: RepositoryPair) -> PairOutcome {
        info!("Migrating pull requests and issues");
        let mut log = ActionLog::new(self.config.dry_run());
        let mut counts = ReplicationCounts::default();

        match self.replicate_pair(&pair, &mut log, &mut counts).await {
            Ok(walk) => {
                info!(
                    ?walk,
                    created = counts.objects_created(),
                    "Finished pair"
                );
                PairOutcome::Replicated {
                    pair,
                    walk,
                    counts,
                    actions: log.into_actions(),
                }
            }
            Err(e) => {
                let error = error_chain(&e);
                error!(error = %error, "Could not complete PR migration");
                PairOutcome::Failed {
                    pair,
                    counts,
                    actions: log.into_actions(),
                    error,
                }
            }
        }
    }

    async fn replicate_pair(
        &self,
        pair: &RepositoryPair,
        log: &mut ActionLog,
        counts: &mut ReplicationCounts,
    ) -> Result<WalkOutcome, ReplicationError> {
        let source = self.source.as_ref();
        let destination = self.destination.as_ref();

        let destination_latest = destination.latest_number(&pair.destination).await?;
        let source_latest = source.latest_number(&pair.source).await?;
        info!(destination_latest, source_latest, "Computed replication range");

        if self.config.check_closed_prs() {
            reconcile_closed_pulls(source, destination, pair, log, counts).await?;
        }

        let settings = self.config.settings();
        Replicator::new(source, destination, &self.renderer, &settings.user_suffix)
            .with_absence_tolerance(settings.absence_tolerance)
            .replicate_range(
                pair,
                replication_range(destination_latest, source_latest),
                log,
                counts,
            )
            .await
    }
}

fn connect(
    role: &'static str,
    settings: &InstanceSettings,
    token: &str,
    throttle: Throttle,
) -> Result<GitHubPlatform, RunnerError> {
    let instance = settings
        .resolve()
        .map_err(|message| RunnerError::Instance { role, message })?;
    info!(role, instance = %instance.name, api_url = %instance.api_url, "Connecting");
    let client = ApiClient::new(instance, token, throttle)?;
    Ok(GitHubPlatform::new(client)?)
}

/// Formats an error followed by its sources.
fn error_chain(error: &ReplicationError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Method, PlatformError};

    #[test]
    fn error_chain_includes_sources() {
        let error = ReplicationError::Platform(PlatformError::UnexpectedStatus {
            method: Method::Post,
            url: "https://api.github.com/repos/o/r/pulls".to_string(),
            status: 422,
            body: "{}".to_string(),
        });
        let chain = error_chain(&error);
        assert!(chain.contains("422"));
    }

    #[test]
    fn unusable_instance_url_is_a_setup_failure() {
        let settings = InstanceSettings::new("not a url");
        let result = connect("source", &settings, "token", Throttle::default());
        assert!(matches!(
            result,
            Err(RunnerError::Instance { role: "source", .. })
        ));
    }
}
