//! Install-time population of the namespace from a fixed manifest.

use tether_core::{Namespace, Request};
use url::Url;

use crate::fetch::Network;

/// Fetch and store every manifest entry, in order, skipping failures.
///
/// An entry is skipped when the network fails, when the status is not 2xx,
/// or when the write fails. Nothing aborts the remaining entries and nothing
/// is reported back; the outcome is only logged.
pub async fn precache(namespace: &Namespace, network: &dyn Network, manifest: &[Url]) {
    let mut stored = 0usize;

    for url in manifest {
        let request = Request::get(url.clone());

        let response = match network.fetch(&request).await {
            Ok(response) if response.ok() => response,
            Ok(response) => {
                tracing::debug!(url = %url, status = response.status, "precache skipped: bad status");
                continue;
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "precache skipped: network");
                continue;
            }
        };

        match namespace.put(&request, response).await {
            Ok(()) => stored += 1,
            Err(e) => tracing::debug!(url = %url, error = %e, "precache skipped: store"),
        }
    }

    tracing::info!(
        namespace = namespace.name(),
        stored,
        skipped = manifest.len() - stored,
        "precache finished"
    );
}
