//! Client side of tether: the network seam and the interception worker.
//!
//! This crate provides the reqwest-backed network client and the worker that
//! classifies intercepted requests, applies caching strategies, and manages
//! the install/activate lifecycle of versioned cache namespaces.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network};
pub use worker::{
    CacheWorker, Intercept, LifecycleState, RequestClass, ServiceWorker, WorkerSettings, WorkerStatus, classify,
};
