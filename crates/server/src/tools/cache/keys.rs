//! cache_keys tool implementation.
//!
//! Lists namespaces with their entry counts, or the entries of one namespace.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_core::cache::{EntrySummary, NamespaceInfo};
use tether_core::{CacheDb, Error};

use crate::error::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// List this namespace's entries instead of the namespaces.
    pub namespace: Option<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CacheKeysOutput {
    Namespaces { namespaces: Vec<NamespaceInfo> },
    Entries { namespace: String, entries: Vec<EntrySummary> },
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(cache: &CacheDb, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let output = match params.namespace {
        None => CacheKeysOutput::Namespaces { namespaces: cache.namespace_infos().await? },
        Some(name) => {
            if !cache.has_namespace(&name).await? {
                return Err(Error::CacheMiss(format!("no namespace named {name}")).into());
            }
            let entries = cache.open_namespace(&name).await?.entries().await?;
            CacheKeysOutput::Entries { namespace: name, entries }
        }
    };

    json_result(&output)
}
