//! Rate-limited access to one GitHub instance.
//!
//! [`ApiClient`] wraps an authenticated [`Octocrab`] and sends raw requests
//! to absolute URLs, so the same client works against GitHub.com and
//! GitHub Enterprise Server. Before every request it consults the instance's
//! remaining quota and, for mutating requests, paces calls.

mod error;
pub mod pagination;
mod response;

pub use error::PlatformError;
pub use response::{next_link, ApiResponse};

use crate::config::Instance;
use crate::rate_limit::{
    wait_if_needed, RateLimitInfo, RateLimitResponse, RequestKind, Throttle,
};
use octocrab::Octocrab;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    /// Returns true for methods that change state on the instance.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// What is known about an instance's quota.
#[derive(Debug, Clone, Copy)]
enum Quota {
    Unknown,
    Known(RateLimitInfo),
    /// The instance has rate limiting disabled.
    Unlimited,
}

/// Rate-limited client for one GitHub instance.
pub struct ApiClient {
    octocrab: Octocrab,
    instance: Instance,
    throttle: Throttle,
    quota: Mutex<Quota>,
}

impl ApiClient {
    /// Builds a client authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::GitHub`] if the client cannot be built.
    pub fn new(instance: Instance, token: &str, throttle: Throttle) -> Result<Self, PlatformError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(instance.api_url.as_str())?
            .build()?;
        Ok(Self::with_octocrab(octocrab, instance, throttle))
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn with_octocrab(octocrab: Octocrab, instance: Instance, throttle: Throttle) -> Self {
        Self {
            octocrab,
            instance,
            throttle,
            quota: Mutex::new(Quota::Unknown),
        }
    }

    /// The instance this client talks to.
    #[must_use]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] on transport failure. Non-2xx statuses are
    /// returned as responses.
    pub async fn get(&self, url: &str) -> Result<ApiResponse, PlatformError> {
        self.request(Method::Get, url, None::<&()>, RequestKind::Read)
            .await
    }

    /// Sends a request after waiting for quota and pacing.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] on transport failure. Non-2xx statuses are
    /// returned as responses for the caller to interpret.
    pub async fn request<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        kind: RequestKind,
    ) -> Result<ApiResponse, PlatformError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.ensure_quota().await?;

        let pause = self.throttle.pause_for(kind);
        if method.is_mutating() && !pause.is_zero() {
            debug!(pause_secs = pause.as_secs(), "Pacing mutating request");
            tokio::time::sleep(pause).await;
        }

        debug!(instance = %self.instance.name, %method, url, "Sending request");
        let response = match method {
            Method::Get => self.octocrab._get(url).await?,
            Method::Post => self.octocrab._post(url, body).await?,
            Method::Patch => self.octocrab._patch(url, body).await?,
            Method::Put => self.octocrab._put(url, body).await?,
            Method::Delete => self.octocrab._delete(url, body).await?,
        };

        let status = response.status().as_u16();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let link = header("link");
        let remaining = header("x-ratelimit-remaining");
        let reset = header("x-ratelimit-reset");
        let limit = header("x-ratelimit-limit");

        if url != self.instance.graphql_url {
            self.observe_quota(remaining.as_deref(), reset.as_deref(), limit.as_deref());
        }

        let body = self.octocrab.body_to_string(response).await?;
        debug!(status, url, "Received response");

        Ok(ApiResponse {
            method,
            url: url.to_string(),
            status,
            body,
            next: link.as_deref().and_then(next_link),
        })
    }

    /// Sends a GraphQL document and returns its `data`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::GraphQl`] when the response carries errors or
    /// no data, and [`PlatformError::UnexpectedStatus`] for non-2xx statuses.
    pub async fn graphql(
        &self,
        query: &str,
        variables: &Value,
        kind: RequestKind,
    ) -> Result<Value, PlatformError> {
        let payload = json!({ "query": query, "variables": variables });
        let response = self
            .request(Method::Post, &self.instance.graphql_url, Some(&payload), kind)
            .await?
            .success()?;

        let mut envelope: Value = response.json()?;
        if let Some(errors) = envelope.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let message = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(PlatformError::GraphQl {
                    url: response.url,
                    message,
                });
            }
        }

        match envelope.get_mut("data").map(Value::take) {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(PlatformError::GraphQl {
                url: response.url,
                message: "response carried no data".to_string(),
            }),
        }
    }

    /// Waits for the quota to recover if it is below the threshold.
    async fn ensure_quota(&self) -> Result<(), PlatformError> {
        let quota = *self.quota.lock().unwrap_or_else(PoisonError::into_inner);

        let info = match quota {
            Quota::Unlimited => return Ok(()),
            Quota::Known(info) => info,
            Quota::Unknown => match self.fetch_rate_limit().await? {
                Some(info) => info,
                None => return Ok(()),
            },
        };

        if wait_if_needed(&self.instance.name, &info, self.throttle.threshold).await {
            self.fetch_rate_limit().await?;
        } else {
            debug!(
                instance = %self.instance.name,
                remaining = info.remaining,
                threshold = self.throttle.threshold,
                "Remaining rate limit is at least threshold, no sleep required"
            );
        }
        Ok(())
    }

    /// Queries `/rate_limit` and records the result.
    ///
    /// Returns `None` when the instance has rate limiting disabled.
    async fn fetch_rate_limit(&self) -> Result<Option<RateLimitInfo>, PlatformError> {
        let url = format!("{}/rate_limit", self.instance.api_url);
        let response = self.octocrab._get(url.as_str()).await?;
        let status = response.status().as_u16();
        let body = self.octocrab.body_to_string(response).await?;

        let response = ApiResponse {
            method: Method::Get,
            url,
            status,
            body,
            next: None,
        };

        if response.status == 404 {
            info!(instance = %self.instance.name, "Rate limiting is disabled on this instance");
            self.store_quota(Quota::Unlimited);
            return Ok(None);
        }

        let parsed: RateLimitResponse = response.success()?.json()?;
        self.store_quota(Quota::Known(parsed.rate));
        Ok(Some(parsed.rate))
    }

    fn observe_quota(&self, remaining: Option<&str>, reset: Option<&str>, limit: Option<&str>) {
        let (Some(remaining), Some(reset)) = (
            remaining.and_then(|v| v.parse().ok()),
            reset.and_then(|v| v.parse().ok()),
        ) else {
            return;
        };

        let limit = limit.and_then(|v| v.parse().ok()).unwrap_or(remaining);
        let mut quota = self.quota.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*quota, Quota::Unlimited) {
            *quota = Quota::Known(RateLimitInfo {
                remaining,
                reset,
                limit,
            });
        }
    }

    fn store_quota(&self, quota: Quota) {
        *self.quota.lock().unwrap_or_else(PoisonError::into_inner) = quota;
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("instance", &self.instance)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}
