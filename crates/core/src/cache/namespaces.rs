//! Cache namespace lifecycle: open/create, enumerate, delete.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// Handle to one named namespace.
///
/// This is the object the precache loader, the reaper and the strategy
/// engine receive explicitly; it carries no state beyond the database handle
/// and its name.
#[derive(Clone, Debug)]
pub struct Namespace {
    pub(crate) db: CacheDb,
    name: String,
}

impl Namespace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }
}

/// Summary row for a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NamespaceInfo {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
}

impl CacheDb {
    /// Open the namespace called `name`, creating it if absent.
    pub async fn open_namespace(&self, name: &str) -> Result<Namespace, Error> {
        let owned = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO namespaces (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![owned, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(Namespace { db: self.clone(), name: name.to_string() })
    }

    /// Whether a namespace with this name exists.
    pub async fn has_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM namespaces WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every existing namespace, oldest first.
    pub async fn namespace_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY created_at ASC, rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Every namespace with its entry count, oldest first.
    pub async fn namespace_infos(&self) -> Result<Vec<NamespaceInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<NamespaceInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT n.name, n.created_at, COUNT(e.request_key)
                     FROM namespaces n LEFT JOIN entries e ON e.namespace = n.name
                     GROUP BY n.name
                     ORDER BY n.created_at ASC, n.rowid ASC",
                )?;
                let infos = stmt
                    .query_map([], |row| {
                        Ok(NamespaceInfo {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(infos)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a namespace and all of its entries.
    ///
    /// Returns false if no namespace had that name.
    pub async fn delete_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_namespace_creates_once() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let ns = db.open_namespace("static-v1").await.unwrap();
        db.open_namespace("static-v1").await.unwrap();

        assert_eq!(ns.name(), "static-v1");
        assert_eq!(db.namespace_names().await.unwrap(), vec!["static-v1".to_string()]);
        assert!(db.has_namespace("static-v1").await.unwrap());
        assert!(!db.has_namespace("static-v2").await.unwrap());
    }

    #[tokio::test]
    async fn test_namespace_names_in_creation_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("static-v1").await.unwrap();
        db.open_namespace("static-v2").await.unwrap();

        assert_eq!(db.namespace_names().await.unwrap(), vec!["static-v1".to_string(), "static-v2".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_namespace() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("static-v1").await.unwrap();

        assert!(db.delete_namespace("static-v1").await.unwrap());
        assert!(!db.delete_namespace("static-v1").await.unwrap());
        assert!(db.namespace_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_namespace_infos_empty_namespace() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("static-v1").await.unwrap();

        let infos = db.namespace_infos().await.unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "static-v1");
        assert_eq!(infos[0].entries, 0);
    }
}
