//! Per-class caching strategies.
//!
//! | class | order | on success | on failure |
//! |---|---|---|---|
//! | navigation | network | return, no store | page (search ignored) → offline doc → 503 |
//! | static asset | cache → network | store copy, return | fallback image → 404 |
//! | dynamic same-origin | network | return, no store | exact match → 503 |
//! | cross-origin | network | store copy (any status), return | exact match → 504 |
//!
//! Every path ends in a response. Cache read errors count as misses.

use tether_core::{MatchOptions, Namespace, Request, Response};
use url::Url;

use super::classify::RequestClass;
use super::writes::PendingWrites;
use crate::fetch::Network;

/// Everything a strategy needs, borrowed from the worker for one request.
pub struct StrategyEngine<'a> {
    pub namespace: &'a Namespace,
    pub network: &'a dyn Network,
    pub writes: &'a PendingWrites,
    pub offline_url: &'a Url,
    pub fallback_image_url: &'a Url,
}

impl StrategyEngine<'_> {
    /// Produce the response for `request` using the strategy bound to `class`.
    pub async fn respond(&self, class: RequestClass, request: Request) -> Response {
        tracing::debug!(url = %request.url, class = %class, "intercepted request");
        match class {
            RequestClass::Navigation => self.network_first_offline(&request).await,
            RequestClass::StaticAsset => self.cache_first_populate(&request).await,
            RequestClass::DynamicSameOrigin => self.network_first_silent(&request).await,
            RequestClass::CrossOrigin => self.network_first_runtime_cache(&request).await,
        }
    }

    async fn network_first_offline(&self, request: &Request) -> Response {
        if let Ok(fresh) = self.network.fetch(request).await {
            return fresh;
        }

        let scoped = MatchOptions::ignoring_search().in_namespace(self.namespace.name());
        if let Some(page) = self.lookup(request, &scoped).await {
            tracing::debug!(url = %request.url, "navigation served from cache");
            return page;
        }

        let offline = Request::get(self.offline_url.clone());
        if let Some(doc) = self.lookup(&offline, &MatchOptions::exact().in_namespace(self.namespace.name())).await {
            tracing::debug!(url = %request.url, "navigation served offline document");
            return doc;
        }

        Response::synthetic(503, Some("text/plain"), "Offline")
    }

    async fn cache_first_populate(&self, request: &Request) -> Response {
        if let Some(cached) = self.lookup(request, &MatchOptions::exact()).await {
            tracing::debug!(url = %request.url, "static asset cache hit");
            return cached;
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                self.writes.store(self.namespace, request, response.clone());
                response
            }
            Err(_) => {
                let image = Request::get(self.fallback_image_url.clone());
                match self.lookup(&image, &MatchOptions::exact()).await {
                    Some(fallback) => fallback,
                    None => Response::synthetic(404, None, ""),
                }
            }
        }
    }

    async fn network_first_silent(&self, request: &Request) -> Response {
        match self.network.fetch(request).await {
            Ok(response) => response,
            Err(_) => match self.lookup(request, &MatchOptions::exact()).await {
                Some(cached) => cached,
                None => Response::synthetic(503, None, "Offline"),
            },
        }
    }

    async fn network_first_runtime_cache(&self, request: &Request) -> Response {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.writes.store(self.namespace, request, response.clone());
                response
            }
            Err(_) => match self.lookup(request, &MatchOptions::exact()).await {
                Some(cached) => cached,
                None => Response::synthetic(504, None, ""),
            },
        }
    }

    async fn lookup(&self, request: &Request, opts: &MatchOptions) -> Option<Response> {
        match self.namespace.db().match_request(request, opts).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache lookup failed; treating as miss");
                None
            }
        }
    }
}
