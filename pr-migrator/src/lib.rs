#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod branches;
pub mod classify;
pub mod client;
pub mod config;
pub mod pairs;
pub mod platform;
pub mod rate_limit;
pub mod replicator;
pub mod runner;
pub mod summary;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_support;

pub use branches::{ensure_branch, validate_branch_name, BranchOutcome};
pub use classify::classify;
pub use client::{ApiClient, ApiResponse, Method, PlatformError};
pub use config::{load_settings, parse_settings, ConfigError, Instance, Settings};
pub use pairs::{is_comment, parse_pair, PairError, Repository, RepositoryPair};
pub use platform::{
    GitHubPlatform, ItemKind, ItemState, MemoryOperation, MemoryPlatform, NumberedItem, Platform,
};
pub use rate_limit::{wait_if_needed, RateLimitInfo, RequestKind, Throttle};
pub use replicator::{
    replication_range, ActionLog, PlannedAction, ReplicationCounts, ReplicationError, Replicator,
    WalkOutcome,
};
pub use runner::{reconcile_closed_pulls, Runner, RunnerConfig, RunnerError};
pub use summary::{PairOutcome, RunSummary};
pub use templates::{TemplateError, TemplateRenderer};
