//! cache_clear tool implementation.
//!
//! Explicitly deletes one namespace. Clearing the live namespace empties the
//! worker's cache until entries are stored again; it does not re-run install.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_core::{CacheDb, Error};

use crate::error::json_result;

/// Parameters for the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearParams {
    /// Namespace to delete.
    pub namespace: String,
}

/// Output from the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    pub deleted: bool,
}

/// Implementation of the cache_clear tool.
pub async fn clear_impl(cache: &CacheDb, params: CacheClearParams) -> Result<CallToolResult, McpError> {
    if params.namespace.trim().is_empty() {
        return Err(Error::InvalidInput("namespace cannot be empty".into()).into());
    }

    let deleted = cache.delete_namespace(&params.namespace).await?;
    tracing::info!(namespace = %params.namespace, deleted, "cache namespace cleared");

    json_result(&CacheClearOutput { deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::output_of;

    #[tokio::test]
    async fn test_clear_existing() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache.open_namespace("static-v1").await.unwrap();

        let output: CacheClearOutput =
            output_of(clear_impl(&cache, CacheClearParams { namespace: "static-v1".into() }).await.unwrap());
        assert!(output.deleted);
        assert!(cache.namespace_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_missing() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let output: CacheClearOutput =
            output_of(clear_impl(&cache, CacheClearParams { namespace: "static-v1".into() }).await.unwrap());
        assert!(!output.deleted);
    }

    #[tokio::test]
    async fn test_clear_empty_name() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        assert!(clear_impl(&cache, CacheClearParams { namespace: " ".into() }).await.is_err());
    }
}
