//! tether server entry point.
//!
//! Loads configuration, opens the cache database, runs the worker's install
//! and activate phases to completion, and only then serves MCP on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tether_client::{CacheWorker, FetchClient, FetchConfig, WorkerSettings};
use tether_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        version = %config.cache_version,
        origin = %config.origin,
        db_path = %config.db_path.display(),
        "starting tether"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network = FetchClient::new(FetchConfig::from_app_config(&config))?;
    let worker = Arc::new(CacheWorker::new(db, Arc::new(network), WorkerSettings::from_config(&config)?));

    worker.start().await?;

    let handler = handler::TetherServer::new(worker.clone());
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    let flushed = worker.settle().await;
    tracing::info!(flushed, "pending cache writes settled; shutting down");

    Ok(())
}
