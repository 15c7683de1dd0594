//! URL handling for intercepted requests.
//!
//! Incoming URLs may be absolute or paths relative to the serving origin.
//! Both are normalized the same way so that cache identity is stable.

use url::{Origin, Url};

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request URL against the serving origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references (`/about`, `app.css`) against `base`
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether `url` belongs to `origin` (scheme, host and port all equal).
pub fn is_same_origin(url: &Url, origin: &Origin) -> bool {
    url.origin() == *origin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://somewheria.example/").unwrap()
    }

    #[test]
    fn test_resolve_absolute_path() {
        let url = resolve(&base(), "/for-rent").unwrap();
        assert_eq!(url.as_str(), "https://somewheria.example/for-rent");
    }

    #[test]
    fn test_resolve_absolute_url_keeps_origin() {
        let url = resolve(&base(), "https://cdn.example.net/lib.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.net"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&base(), "https://CDN.Example.NET/a").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.net"));
    }

    #[test]
    fn test_resolve_remove_fragment_preserve_query() {
        let url = resolve(&base(), "/about?lang=en#team").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("lang=en"));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&base(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&base(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_same_origin() {
        let origin = base().origin();
        assert!(is_same_origin(&Url::parse("https://somewheria.example/x").unwrap(), &origin));
        assert!(!is_same_origin(&Url::parse("http://somewheria.example/x").unwrap(), &origin));
        assert!(!is_same_origin(&Url::parse("https://somewheria.example:8443/x").unwrap(), &origin));
        assert!(!is_same_origin(&Url::parse("https://ads.tracker.example/p").unwrap(), &origin));
    }
}
