//! Stored responses: write, look up, enumerate.
//!
//! Entries are immutable once written. A second write under the same
//! request key replaces the row wholesale (last write wins).

use super::connection::CacheDb;
use super::hash::{identity_url, request_key, url_without_search};
use super::namespaces::Namespace;
use crate::Error;
use crate::http::{Request, Response, ResponseType};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Lookup options, mirroring the platform's cache matching flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Compare URLs with the query string removed.
    pub ignore_search: bool,
    /// Restrict the lookup to one namespace. `None` searches all of them,
    /// oldest namespace first.
    pub namespace: Option<String>,
}

impl MatchOptions {
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn ignoring_search() -> Self {
        Self { ignore_search: true, namespace: None }
    }

    pub fn in_namespace(mut self, name: impl Into<String>) -> Self {
        self.namespace = Some(name.into());
        self
    }
}

/// A response snapshot as persisted in a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub namespace: String,
    pub request_key: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: String,
}

impl StoredResponse {
    /// Replay the snapshot as a fresh response value.
    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
            body: self.body,
            response_type: self.response_type,
            url: url::Url::parse(&self.url).ok(),
        }
    }
}

/// Listing row for an entry, without its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntrySummary {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub response_type: String,
    pub size: u64,
    pub stored_at: String,
}

const SELECT_ENTRY: &str = "SELECT e.namespace, e.request_key, e.method, e.url, e.status, e.status_text,
        e.response_type, e.headers_json, e.body, e.stored_at
     FROM entries e JOIN namespaces n ON n.name = e.namespace";

type RawEntry = (String, String, String, String, i64, String, String, String, Vec<u8>, String);

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn decode(raw: RawEntry) -> Result<StoredResponse, Error> {
    let (namespace, request_key, method, url, status, status_text, response_type, headers_json, body, stored_at) = raw;
    let headers: Vec<(String, String)> =
        serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("{url}: headers: {e}")))?;
    let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("{url}: status {status}")))?;
    Ok(StoredResponse {
        namespace,
        request_key,
        method,
        url,
        status,
        status_text,
        response_type: response_type.parse()?,
        headers,
        body: Bytes::from(body),
        stored_at,
    })
}

impl Namespace {
    /// Store `response` under the identity of `request`.
    ///
    /// Takes the response by value: callers that also hand the response to
    /// someone else must clone it first. A namespace deleted since it was
    /// opened is recreated, as opening it again would.
    pub async fn put(&self, request: &Request, response: Response) -> Result<(), Error> {
        let namespace = self.name().to_string();
        let key = request_key(&request.method, &request.url);
        let method = request.method.to_ascii_uppercase();
        let url = identity_url(&request.url);
        let bare = url_without_search(&request.url);
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::InvalidInput(format!("headers: {e}")))?;
        let stored_at = chrono::Utc::now().to_rfc3339();

        tracing::debug!(namespace = %namespace, url = %url, status = response.status, "storing response");

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO namespaces (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![namespace, stored_at],
                )?;
                tx.execute(
                    "INSERT INTO entries (
                        namespace, request_key, method, url, url_without_search,
                        status, status_text, response_type, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    ON CONFLICT(namespace, request_key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        url_without_search = excluded.url_without_search,
                        status = excluded.status,
                        status_text = excluded.status_text,
                        response_type = excluded.response_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        namespace,
                        key,
                        method,
                        url,
                        bare,
                        response.status as i64,
                        response.status_text,
                        response.response_type.as_str(),
                        headers_json,
                        response.body.to_vec(),
                        stored_at,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up `request` in this namespace only.
    pub async fn match_request(&self, request: &Request, ignore_search: bool) -> Result<Option<Response>, Error> {
        let opts = MatchOptions { ignore_search, namespace: Some(self.name().to_string()) };
        Ok(self.db.match_entry(request, &opts).await?.map(StoredResponse::into_response))
    }

    /// List the entries of this namespace in insertion order.
    pub async fn entries(&self) -> Result<Vec<EntrySummary>, Error> {
        let namespace = self.name().to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<EntrySummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, response_type, LENGTH(body), stored_at
                     FROM entries WHERE namespace = ?1 ORDER BY rowid ASC",
                )?;
                let rows = stmt
                    .query_map(params![namespace], |row| {
                        Ok(EntrySummary {
                            method: row.get(0)?,
                            url: row.get(1)?,
                            status: row.get::<_, i64>(2)? as u16,
                            response_type: row.get(3)?,
                            size: row.get::<_, i64>(4)? as u64,
                            stored_at: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheDb {
    /// Find the stored entry matching `request` under `opts`.
    ///
    /// With several candidates, the oldest namespace wins, then the earliest
    /// written entry within it.
    pub async fn match_entry(&self, request: &Request, opts: &MatchOptions) -> Result<Option<StoredResponse>, Error> {
        let method = request.method.to_ascii_uppercase();
        let key = request_key(&method, &request.url);
        let bare = url_without_search(&request.url);
        let ignore_search = opts.ignore_search;
        let namespace = opts.namespace.clone();

        let raw = self
            .conn
            .call(move |conn| -> Result<Option<RawEntry>, Error> {
                let result = if ignore_search {
                    conn.query_row(
                        &format!(
                            "{SELECT_ENTRY}
                             WHERE e.method = ?1 AND e.url_without_search = ?2
                               AND (?3 IS NULL OR e.namespace = ?3)
                             ORDER BY n.created_at ASC, n.rowid ASC, e.rowid ASC
                             LIMIT 1"
                        ),
                        params![method, bare, namespace],
                        read_raw,
                    )
                } else {
                    conn.query_row(
                        &format!(
                            "{SELECT_ENTRY}
                             WHERE e.request_key = ?1
                               AND (?2 IS NULL OR e.namespace = ?2)
                             ORDER BY n.created_at ASC, n.rowid ASC
                             LIMIT 1"
                        ),
                        params![key, namespace],
                        read_raw,
                    )
                };

                match result {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        raw.map(decode).transpose()
    }

    /// Look up `request` and replay the match as a response.
    pub async fn match_request(&self, request: &Request, opts: &MatchOptions) -> Result<Option<Response>, Error> {
        Ok(self.match_entry(request, opts).await?.map(StoredResponse::into_response))
    }
}
