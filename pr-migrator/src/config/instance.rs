//! Platform instance endpoints.

use serde::Deserialize;
use url::Url;

/// Endpoints of one GitHub instance as written in the settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceSettings {
    /// REST API root (e.g., "https://api.github.com").
    pub api_url: String,

    /// GraphQL endpoint. Derived from `api_url` when omitted.
    pub graphql_url: Option<String>,

    /// Display name used in logs. Defaults to the API host.
    pub name: Option<String>,
}

impl InstanceSettings {
    pub(crate) fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            graphql_url: None,
            name: None,
        }
    }

    /// Resolves the optional fields into a complete [`Instance`].
    ///
    /// # Errors
    ///
    /// Returns the parse error message when either URL is malformed.
    pub fn resolve(&self) -> Result<Instance, String> {
        let api = Url::parse(&self.api_url).map_err(|e| format!("api-url: {e}"))?;
        let api_url = self.api_url.trim_end_matches('/').to_string();

        let graphql_url = match &self.graphql_url {
            Some(url) => {
                Url::parse(url).map_err(|e| format!("graphql-url: {e}"))?;
                url.trim_end_matches('/').to_string()
            }
            None => derive_graphql_url(&api_url),
        };

        let name = self
            .name
            .clone()
            .or_else(|| api.host_str().map(|h| h.trim_start_matches("api.").to_string()))
            .unwrap_or_else(|| api_url.clone());

        Ok(Instance {
            name,
            api_url,
            graphql_url,
        })
    }
}

/// A resolved GitHub instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Display name (e.g., "github.com").
    pub name: String,

    /// REST API root without a trailing slash.
    pub api_url: String,

    /// GraphQL endpoint.
    pub graphql_url: String,
}

/// Enterprise Server exposes GraphQL at `/api/graphql` next to `/api/v3`.
fn derive_graphql_url(api_url: &str) -> String {
    match api_url.strip_suffix("/api/v3") {
        Some(root) => format!("{root}/api/graphql"),
        None => format!("{api_url}/graphql"),
    }
}
