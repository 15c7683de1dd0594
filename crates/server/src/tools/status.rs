//! worker_status tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use tether_client::CacheWorker;

use crate::error::json_result;

/// Implementation of the worker_status tool.
pub async fn status_impl(worker: &CacheWorker) -> Result<CallToolResult, McpError> {
    json_result(&worker.status())
}
