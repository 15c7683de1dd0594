//! cache_match tool implementation.
//!
//! Looks up a stored response the way the worker's fallbacks do.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_client::CacheWorker;
use tether_client::fetch::resolve;
use tether_core::{Error, MatchOptions, Request};

use crate::error::{ToolError, json_result};
use crate::tools::response::ResponseView;

/// Parameters for the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchParams {
    /// Absolute URL, or a path resolved against the serving origin.
    pub url: String,

    /// Ignore the query string when comparing URLs.
    #[serde(default)]
    pub ignore_search: bool,

    /// Only look in this namespace.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Output from the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchOutput {
    pub namespace: String,
    pub url: String,
    pub stored_at: String,
    pub response: ResponseView,
}

/// Implementation of the cache_match tool.
pub async fn match_impl(worker: &CacheWorker, params: CacheMatchParams) -> Result<CallToolResult, McpError> {
    let url = resolve(&worker.settings().origin, &params.url).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
    let opts = MatchOptions { ignore_search: params.ignore_search, namespace: params.namespace };

    let stored = worker
        .db()
        .match_entry(&Request::get(url.clone()), &opts)
        .await?
        .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    let output = CacheMatchOutput {
        namespace: stored.namespace.clone(),
        url: stored.url.clone(),
        stored_at: stored.stored_at.clone(),
        response: ResponseView::from(&stored.into_response()),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{offline_worker, output_of};
    use tether_core::Response;

    #[tokio::test]
    async fn test_match_miss() {
        let worker = offline_worker().await;
        let params = CacheMatchParams { url: "/nothing".into(), ignore_search: false, namespace: None };
        assert!(match_impl(&worker, params).await.is_err());
    }

    #[tokio::test]
    async fn test_match_ignoring_search() {
        let worker = offline_worker().await;
        let ns = worker.db().open_namespace(&worker.settings().namespace).await.unwrap();
        let url = resolve(&worker.settings().origin, "/for-rent").unwrap();
        ns.put(&Request::get(url), Response::synthetic(200, Some("text/html"), "<ul></ul>"))
            .await
            .unwrap();

        let exact = CacheMatchParams { url: "/for-rent?page=2".into(), ignore_search: false, namespace: None };
        assert!(match_impl(&worker, exact).await.is_err());

        let loose = CacheMatchParams { url: "/for-rent?page=2".into(), ignore_search: true, namespace: None };
        let output: CacheMatchOutput = output_of(match_impl(&worker, loose).await.unwrap());
        assert_eq!(output.namespace, "static-v1.0.0");
        assert_eq!(output.response.body_text.as_deref(), Some("<ul></ul>"));
    }
}
