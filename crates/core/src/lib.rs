//! Core types and shared functionality for tether.
//!
//! This crate provides:
//! - The versioned cache store with SQLite backend
//! - Request/response values shared by the worker and its hosts
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, MatchOptions, Namespace, StoredResponse};
pub use config::AppConfig;
pub use error::Error;
pub use http::{Destination, Request, RequestMode, Response, ResponseType};
