//! Lazy draining of paginated listings.
//!
//! Both cursors are finite and restart only from their first request: a
//! failed page ends the stream with that error, and a retry means calling the
//! function again.

use super::{ApiClient, PlatformError};
use crate::rate_limit::RequestKind;
use futures::stream::{self, Stream, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;

/// Page size requested from list endpoints.
pub const PER_PAGE: u8 = 100;

/// Streams every element of a REST listing, following `Link: rel="next"`.
///
/// Each page must be a JSON array.
pub fn drain(
    client: &ApiClient,
    first_url: String,
) -> impl Stream<Item = Result<Value, PlatformError>> + Send + '_ {
    stream::try_unfold(Some(first_url), move |next| async move {
        let Some(url) = next else {
            return Ok::<_, PlatformError>(None);
        };

        let response = client.get(&url).await?.success()?;
        let items: Vec<Value> = response.json()?;
        let page = stream::iter(items.into_iter().map(Ok::<_, PlatformError>));
        Ok::<_, PlatformError>(Some((page, response.next)))
    })
    .try_flatten()
}

/// A GraphQL connection page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection {
    #[serde(default)]
    nodes: Vec<Value>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

/// Streams the `nodes` of a GraphQL connection, following `endCursor`.
///
/// `query` must declare an `$after: String` variable and pass it to the
/// connection found at `path` inside `data`.
pub fn drain_connection<'a>(
    client: &'a ApiClient,
    query: &'a str,
    variables: Value,
    path: &'a [&'a str],
) -> impl Stream<Item = Result<Value, PlatformError>> + Send + 'a {
    // None: exhausted. Some(None): first page. Some(Some(cursor)): later page.
    stream::try_unfold(Some(None::<String>), move |state| {
        let mut variables = variables.clone();
        async move {
            let Some(after) = state else {
                return Ok::<_, PlatformError>(None);
            };

            if let Value::Object(map) = &mut variables {
                map.insert("after".to_string(), after.map_or(Value::Null, Value::String));
            }

            let data = client.graphql(query, &variables, RequestKind::Read).await?;
            let connection = path
                .iter()
                .try_fold(&data, |value, key| value.get(*key))
                .filter(|value| !value.is_null())
                .ok_or_else(|| PlatformError::GraphQl {
                    url: client.instance().graphql_url.clone(),
                    message: format!("missing connection at {}", path.join(".")),
                })?;

            let page: Connection =
                serde_json::from_value(connection.clone()).map_err(|source| PlatformError::Json {
                    url: client.instance().graphql_url.clone(),
                    source,
                })?;

            let next = match page.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(cursor),
                } => Some(Some(cursor)),
                _ => None,
            };
            let nodes = stream::iter(page.nodes.into_iter().map(Ok::<_, PlatformError>));
            Ok::<_, PlatformError>(Some((nodes, next)))
        }
    })
    .try_flatten()
}

/// Appends the page size to a list URL.
#[must_use]
pub fn with_page_size(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}per_page={PER_PAGE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_page_size() {
        assert_eq!(
            with_page_size("https://api.github.com/repos/o/r/issues/1/comments"),
            "https://api.github.com/repos/o/r/issues/1/comments?per_page=100"
        );
        assert_eq!(
            with_page_size("https://x/y?sort=created"),
            "https://x/y?sort=created&per_page=100"
        );
    }

    #[test]
    fn parses_connection_page() {
        let page: Connection = serde_json::from_value(serde_json::json!({
            "nodes": [{"number": 4}, {"number": 2}],
            "pageInfo": {"hasNextPage": true, "endCursor": "Y3Vyc29y", "startCursor": "x"}
        }))
        .unwrap();

        assert_eq!(page.nodes.len(), 2);
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("Y3Vyc29y"));
    }
}
