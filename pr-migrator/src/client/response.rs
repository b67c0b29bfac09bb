//! Raw API responses.

use super::{Method, PlatformError};
use serde::de::DeserializeOwned;

/// A buffered response from a GitHub instance.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Method of the request.
    pub method: Method,
    /// URL of the request.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Target of the `rel="next"` link, if the listing continues.
    pub next: Option<String>,
}

impl ApiResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true when the requested object does not exist (404 or 410).
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self.status, 404 | 410)
    }

    /// Passes 2xx responses through and turns anything else into an error.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnexpectedStatus`] for non-2xx statuses.
    pub fn success(self) -> Result<Self, PlatformError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }

    /// Deserializes the body.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Json`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, PlatformError> {
        serde_json::from_str(&self.body).map_err(|source| PlatformError::Json {
            url: self.url.clone(),
            source,
        })
    }

    /// Converts the response into an [`PlatformError::UnexpectedStatus`].
    #[must_use]
    pub fn into_error(self) -> PlatformError {
        PlatformError::UnexpectedStatus {
            method: self.method,
            url: self.url,
            status: self.status,
            body: self.body,
        }
    }
}

/// Extracts the `rel="next"` target from a `Link` header.
#[must_use]
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|param| matches!(param.trim(), "rel=\"next\"" | "rel=next"));
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        is_next.then(|| target.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            method: Method::Get,
            url: "https://api.github.com/repos/o/r/pulls/1".to_string(),
            status,
            body: body.to_string(),
            next: None,
        }
    }

    #[test]
    fn finds_next_link() {
        let header = r#"<https://api.github.com/repositories/1/issues/3/comments?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/issues/3/comments?per_page=100&page=4>; rel="last""#;

        assert_eq!(
            next_link(header).as_deref(),
            Some("https://api.github.com/repositories/1/issues/3/comments?per_page=100&page=2")
        );
    }

    #[test]
    fn last_page_has_no_next_link() {
        let header = r#"<https://api.github.com/x?page=1>; rel="prev", <https://api.github.com/x?page=1>; rel="first""#;
        assert_eq!(next_link(header), None);
        assert_eq!(next_link(""), None);
    }

    #[test]
    fn absent_statuses() {
        assert!(response(404, "").is_absent());
        assert!(response(410, "").is_absent());
        assert!(!response(500, "").is_absent());
    }

    #[test]
    fn unexpected_status_keeps_context() {
        let error = response(422, r#"{"message":"Validation Failed"}"#)
            .success()
            .unwrap_err();

        assert_eq!(error.status(), Some(422));
        let message = error.to_string();
        assert!(message.contains("422"));
        assert!(message.contains("Validation Failed"));
        assert!(message.contains("/repos/o/r/pulls/1"));
    }
}
