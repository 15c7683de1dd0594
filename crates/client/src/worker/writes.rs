//! Detached cache writes.
//!
//! Strategies hand the caller its response without waiting for the copy to
//! be persisted. The write is spawned immediately, and [`PendingWrites::settle`]
//! lets the host extend the worker's lifetime until every issued write is done.

use std::sync::Mutex;
use tether_core::{Namespace, Request, Response};
use tokio::task::JoinSet;

#[derive(Default)]
pub struct PendingWrites {
    tasks: Mutex<JoinSet<()>>,
}

impl PendingWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a write of `copy` under `request` into `namespace`.
    ///
    /// `copy` must already be independent of whatever is returned to the
    /// caller. Failures are logged and otherwise ignored.
    pub fn store(&self, namespace: &Namespace, request: &Request, copy: Response) {
        let namespace = namespace.clone();
        let request = request.clone();
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        reap_finished(&mut tasks);
        tasks.spawn(async move {
            if let Err(e) = namespace.put(&request, copy).await {
                tracing::warn!(url = %request.url, namespace = namespace.name(), error = %e, "cache write failed");
            }
        });
    }

    /// Number of writes still in flight.
    pub fn len(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        reap_finished(&mut tasks);
        tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for every write issued so far, including ones issued while
    /// waiting. Returns how many were still in flight when waited on.
    pub async fn settle(&self) -> usize {
        let mut done = 0;
        loop {
            let mut batch = {
                let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
                std::mem::take(&mut *tasks)
            };
            if batch.is_empty() {
                return done;
            }
            while let Some(result) = batch.join_next().await {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "cache write task aborted");
                }
                done += 1;
            }
        }
    }
}

/// Drop every task that has already completed.
fn reap_finished(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.try_join_next() {
        if let Err(e) = result {
            tracing::warn!(error = %e, "cache write task aborted");
        }
    }
}
