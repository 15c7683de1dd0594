//! SQLite-backed store for versioned cache namespaces.
//!
//! Each namespace is a named collection of stored responses keyed by request
//! identity. The store supports:
//!
//! - Creating, enumerating and deleting namespaces
//! - Exact and search-ignoring lookups, across all namespaces or one
//! - Last-write-wins replacement of entries
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod namespaces;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{EntrySummary, MatchOptions, StoredResponse};
pub use namespaces::{Namespace, NamespaceInfo};
