//! intercept tool implementation.
//!
//! Runs one request through the worker exactly as the host platform would
//! deliver it, and reports either the response or that the worker declined.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_client::fetch::resolve;
use tether_client::{CacheWorker, Intercept, ServiceWorker, classify};
use tether_core::{Destination, Request, RequestMode};

use super::response::ResponseView;
use crate::error::{ToolError, json_result};

/// Input parameters for the intercept tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InterceptParams {
    /// Absolute URL, or a path resolved against the serving origin.
    pub url: String,

    /// HTTP method (default: GET). Non-GET requests are always declined.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: navigate, same-origin, no-cors (default) or cors.
    #[serde(default)]
    pub mode: Option<String>,

    /// Destination: document, style, script, image, font, manifest, other,
    /// or empty (default).
    #[serde(default)]
    pub destination: Option<String>,

    /// Extra request headers.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the intercept tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InterceptOutput {
    pub url: String,
    /// Strategy class, absent when declined for being non-GET.
    pub class: Option<String>,
    /// True when the worker let the request pass through untouched.
    pub declined: bool,
    pub response: Option<ResponseView>,
}

impl InterceptParams {
    fn into_request(self, worker: &CacheWorker) -> Result<Request, ToolError> {
        let url = resolve(&worker.settings().origin, &self.url).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        let mode = self
            .mode
            .as_deref()
            .map(str::parse::<RequestMode>)
            .transpose()
            .map_err(|e| ToolError::InvalidInput(e.to_string()))?
            .unwrap_or_default();
        let destination = self
            .destination
            .as_deref()
            .map(str::parse::<Destination>)
            .transpose()
            .map_err(|e| ToolError::InvalidInput(e.to_string()))?
            .unwrap_or_default();

        let request = Request::get(url)
            .with_method(self.method)
            .with_mode(mode)
            .with_destination(destination);
        Ok(self
            .headers
            .into_iter()
            .fold(request, |request, (name, value)| request.with_header(name, value)))
    }
}

/// Implementation of the intercept tool.
pub async fn intercept_impl(worker: &CacheWorker, params: InterceptParams) -> Result<CallToolResult, McpError> {
    let request = params.into_request(worker)?;
    let url = request.url.to_string();
    let class = classify(&request, &worker.settings().origin.origin());

    let output = match worker.on_intercept(request).await {
        Intercept::Respond(response) => InterceptOutput {
            url,
            class: class.map(|c| c.to_string()),
            declined: false,
            response: Some(ResponseView::from(&response)),
        },
        Intercept::Decline => {
            InterceptOutput { url, class: class.map(|c| c.to_string()), declined: true, response: None }
        }
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{offline_worker, output_of};
    use tether_core::Response;

    fn params(url: &str, mode: Option<&str>, destination: Option<&str>) -> InterceptParams {
        InterceptParams {
            url: url.into(),
            method: default_method(),
            mode: mode.map(str::to_string),
            destination: destination.map(str::to_string),
            headers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_post_is_declined() {
        let worker = offline_worker().await;
        let mut p = params("/contact", Some("navigate"), None);
        p.method = "post".into();

        let output: InterceptOutput = output_of(intercept_impl(&worker, p).await.unwrap());
        assert!(output.declined);
        assert!(output.class.is_none());
        assert!(output.response.is_none());
    }

    #[tokio::test]
    async fn test_navigation_offline_is_503() {
        let worker = offline_worker().await;

        let output: InterceptOutput =
            output_of(intercept_impl(&worker, params("/about", Some("navigate"), None)).await.unwrap());
        let response = output.response.unwrap();
        assert_eq!(output.class.as_deref(), Some("navigation"));
        assert_eq!(response.status, 503);
        assert_eq!(response.body_text.as_deref(), Some("Offline"));
    }

    #[tokio::test]
    async fn test_static_served_from_cache() {
        let worker = offline_worker().await;
        let ns = worker.db().open_namespace(&worker.settings().namespace).await.unwrap();
        let url = resolve(&worker.settings().origin, "/static/site.css").unwrap();
        ns.put(&Request::get(url), Response::synthetic(200, Some("text/css"), "body{}"))
            .await
            .unwrap();

        let output: InterceptOutput =
            output_of(intercept_impl(&worker, params("/static/site.css", None, Some("style"))).await.unwrap());
        assert_eq!(output.class.as_deref(), Some("static_asset"));
        assert_eq!(output.response.unwrap().body_text.as_deref(), Some("body{}"));
    }

    #[tokio::test]
    async fn test_cross_origin_offline_is_504() {
        let worker = offline_worker().await;

        let output: InterceptOutput =
            output_of(intercept_impl(&worker, params("https://ads.tracker.example/p.gif", None, Some("image"))).await.unwrap());
        let response = output.response.unwrap();
        assert_eq!(output.class.as_deref(), Some("cross_origin"));
        assert_eq!(response.status, 504);
        assert_eq!(response.body_len, 0);
    }

    #[tokio::test]
    async fn test_headers_carried_onto_request() {
        let worker = offline_worker().await;
        let mut p = params("/api/listings", None, None);
        p.headers = vec![("accept".into(), "application/json".into())];

        let request = p.into_request(&worker).unwrap();
        assert_eq!(request.url.as_str(), "https://somewheria.example/api/listings");
        assert_eq!(request.headers, vec![("accept".to_string(), "application/json".to_string())]);
    }

    #[tokio::test]
    async fn test_unknown_mode_is_invalid_input() {
        let worker = offline_worker().await;
        let result = intercept_impl(&worker, params("/", Some("websocket"), None)).await;
        assert!(result.is_err());
    }
}
