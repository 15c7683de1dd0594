//! Request identity.
//!
//! Entries are keyed by the hex SHA-256 of `METHOD\nURL`, with the URL
//! fragment removed. Search-ignoring lookups compare the URL with both query
//! and fragment removed, which keeps them scoped to the request's origin.

use sha2::{Digest, Sha256};
use url::Url;

/// Compute the storage key for a request.
pub fn request_key(method: &str, url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(identity_url(url).as_bytes());
    hex::encode(hasher.finalize())
}

/// The URL as stored: fragment removed, query kept.
pub fn identity_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// The URL with query and fragment removed.
pub fn url_without_search(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_key_stability() {
        let a = request_key("GET", &url("https://example.com/a"));
        let b = request_key("get", &url("https://example.com/a"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_ignores_fragment() {
        let a = request_key("GET", &url("https://example.com/a#top"));
        let b = request_key("GET", &url("https://example.com/a"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_respects_query_and_method() {
        let plain = request_key("GET", &url("https://example.com/a"));
        assert_ne!(plain, request_key("GET", &url("https://example.com/a?x=1")));
        assert_ne!(plain, request_key("HEAD", &url("https://example.com/a")));
    }

    #[test]
    fn test_key_format() {
        let key = request_key("GET", &url("https://example.com/"));
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_url_without_search() {
        assert_eq!(url_without_search(&url("https://example.com/p?q=1#f")), "https://example.com/p");
        assert_ne!(
            url_without_search(&url("https://example.com/p?q=1")),
            url_without_search(&url("https://other.example/p?q=1"))
        );
    }
}
