//! Shared fixtures for tool tests.

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tether_client::{CacheWorker, Network, WorkerSettings};
use tether_core::{AppConfig, CacheDb, Error, Request, Response};

/// A network with no connectivity at all.
pub(crate) struct OfflineNetwork;

#[async_trait]
impl Network for OfflineNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        Err(Error::Network(format!("{}: offline", request.url)))
    }
}

/// An activated worker whose network is always unavailable.
pub(crate) async fn offline_worker() -> CacheWorker {
    let config = AppConfig {
        origin: "https://somewheria.example".into(),
        precache: vec!["/".into(), "/offline".into()],
        ..Default::default()
    };
    let db = CacheDb::open_in_memory().await.unwrap();
    let worker = CacheWorker::new(db, Arc::new(OfflineNetwork), WorkerSettings::from_config(&config).unwrap());
    worker.start().await.unwrap();
    worker
}

pub(crate) fn output_of<T: DeserializeOwned>(result: CallToolResult) -> T {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
