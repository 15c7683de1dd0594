//! MCP tool implementations.
//!
//! This module contains all tools exposed by the tether server.

pub mod cache;
pub mod intercept;
pub mod response;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheClearParams, CacheKeysParams, CacheMatchParams};
pub use intercept::{InterceptOutput, InterceptParams};
