//! Settings file deserialization.

use super::instance::InstanceSettings;
use serde::Deserialize;
use std::time::Duration;

/// Default GitHub Enterprise Server API root used as the migration source.
pub const DEFAULT_SOURCE_API_URL: &str = "https://github.example.com/api/v3";

/// Default GitHub.com API root used as the migration destination.
pub const DEFAULT_DESTINATION_API_URL: &str = "https://api.github.com";

/// Handlebars overrides for the rendered bodies.
///
/// Each override replaces the built-in template of the same name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateOverrides {
    /// Body of replayed pull requests and issues.
    pub pull_body: Option<String>,

    /// Body of replayed comments.
    pub comment_body: Option<String>,

    /// Contents of the placeholder file committed to synthetic branches.
    pub placeholder: Option<String>,
}

impl TemplateOverrides {
    /// Iterates over the overrides that are set, with their names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("pull-body", self.pull_body.as_deref()),
            ("comment-body", self.comment_body.as_deref()),
            ("placeholder", self.placeholder.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, template)| template.map(|t| (name, t)))
    }
}

/// Parsed settings file.
///
/// Every key is optional; missing keys take the defaults of
/// [`Settings::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Suffix appended to source logins (`{login}_{suffix}`).
    pub user_suffix: String,

    /// Prefix stripped from a destination org to infer the source org.
    pub destination_org_prefix: String,

    /// Remaining-quota threshold below which requests wait for the reset.
    pub rate_limit_threshold: u32,

    /// Consecutive missing source numbers tolerated before the walk stops.
    pub absence_tolerance: u64,

    /// Pause before every mutating request, in seconds.
    pub mutation_delay_secs: u64,

    /// Pause before requests that create objects, in seconds.
    pub creation_delay_secs: u64,

    /// Instance migrated from.
    pub source: InstanceSettings,

    /// Instance migrated to.
    pub destination: InstanceSettings,

    /// Optional body template overrides.
    pub templates: TemplateOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_suffix: "example".to_string(),
            destination_org_prefix: "example-".to_string(),
            rate_limit_threshold: 120,
            absence_tolerance: 0,
            mutation_delay_secs: 1,
            creation_delay_secs: 5,
            source: InstanceSettings::new(DEFAULT_SOURCE_API_URL),
            destination: InstanceSettings::new(DEFAULT_DESTINATION_API_URL),
            templates: TemplateOverrides::default(),
        }
    }
}

impl Settings {
    /// Pause before every mutating request.
    #[must_use]
    pub fn mutation_delay(&self) -> Duration {
        Duration::from_secs(self.mutation_delay_secs)
    }

    /// Pause before requests that create objects.
    #[must_use]
    pub fn creation_delay(&self) -> Duration {
        Duration::from_secs(self.creation_delay_secs)
    }

    /// Checks the values deserialization cannot.
    ///
    /// Returns a message describing the first problem found.
    pub(crate) fn problems(&self) -> Option<String> {
        if self.user_suffix.trim().is_empty() {
            return Some("user-suffix must not be empty".to_string());
        }
        if self.rate_limit_threshold == 0 {
            return Some("rate-limit-threshold must be greater than zero".to_string());
        }
        if self.creation_delay_secs < self.mutation_delay_secs {
            return Some("creation-delay-secs must be at least mutation-delay-secs".to_string());
        }
        if let Err(message) = self.source.resolve() {
            return Some(format!("source {message}"));
        }
        if let Err(message) = self.destination.resolve() {
            return Some(format!("destination {message}"));
        }
        for (name, template) in self.templates.iter() {
            if let Err(e) = handlebars::Template::compile(template) {
                return Some(format!("templates.{name}: {e}"));
            }
        }
        None
    }
}
