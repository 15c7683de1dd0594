//! Activation-time removal of namespaces from previous versions.

use tether_core::{CacheDb, Error};

/// Delete every namespace whose name differs from `current`.
///
/// Returns the names that were deleted. Running it again with nothing stale
/// deletes nothing.
pub async fn reap(db: &CacheDb, current: &str) -> Result<Vec<String>, Error> {
    let mut reaped = Vec::new();

    for name in db.namespace_names().await? {
        if name == current {
            continue;
        }
        if db.delete_namespace(&name).await? {
            tracing::info!(namespace = %name, "reaped stale cache namespace");
            reaped.push(name);
        }
    }

    Ok(reaped)
}
