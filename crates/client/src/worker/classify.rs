//! Request classification.
//!
//! A strict priority chain: the method gate first, then navigation mode,
//! then origin and destination.

use serde::Serialize;
use std::fmt;
use tether_core::{Destination, Request, RequestMode};
use url::Origin;

use crate::fetch::is_same_origin;

/// Which caching strategy a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    Navigation,
    StaticAsset,
    DynamicSameOrigin,
    CrossOrigin,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::StaticAsset => "static_asset",
            Self::DynamicSameOrigin => "dynamic_same_origin",
            Self::CrossOrigin => "cross_origin",
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `request` relative to the serving `origin`.
///
/// Returns `None` for anything but `GET`: those requests are never
/// intercepted.
pub fn classify(request: &Request, origin: &Origin) -> Option<RequestClass> {
    if !request.is_get() {
        return None;
    }

    if request.mode == RequestMode::Navigate {
        return Some(RequestClass::Navigation);
    }

    if !is_same_origin(&request.url, origin) {
        return Some(RequestClass::CrossOrigin);
    }

    match request.destination {
        Destination::Style | Destination::Script | Destination::Image | Destination::Font => {
            Some(RequestClass::StaticAsset)
        }
        _ => Some(RequestClass::DynamicSameOrigin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn origin() -> Origin {
        Url::parse("https://somewheria.example").unwrap().origin()
    }

    fn req(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_non_get_is_never_classified() {
        for method in ["POST", "PUT", "DELETE", "HEAD", "PATCH"] {
            let request = req("https://somewheria.example/contact")
                .with_method(method)
                .with_mode(RequestMode::Navigate);
            assert_eq!(classify(&request, &origin()), None, "{method}");
        }
    }

    #[test]
    fn test_navigation_regardless_of_origin() {
        let same = req("https://somewheria.example/about").with_mode(RequestMode::Navigate);
        let cross = req("https://elsewhere.example/").with_mode(RequestMode::Navigate);
        assert_eq!(classify(&same, &origin()), Some(RequestClass::Navigation));
        assert_eq!(classify(&cross, &origin()), Some(RequestClass::Navigation));
    }

    #[test]
    fn test_navigation_beats_static_destination() {
        let request = req("https://somewheria.example/logo.png")
            .with_mode(RequestMode::Navigate)
            .with_destination(Destination::Image);
        assert_eq!(classify(&request, &origin()), Some(RequestClass::Navigation));
    }

    #[test]
    fn test_static_destinations() {
        for dest in [Destination::Style, Destination::Script, Destination::Image, Destination::Font] {
            let request = req("https://somewheria.example/static/a").with_destination(dest);
            assert_eq!(classify(&request, &origin()), Some(RequestClass::StaticAsset), "{dest:?}");
        }
    }

    #[test]
    fn test_other_same_origin_is_dynamic() {
        for dest in [Destination::Empty, Destination::Manifest, Destination::Document, Destination::Other] {
            let request = req("https://somewheria.example/api/listings").with_destination(dest);
            assert_eq!(classify(&request, &origin()), Some(RequestClass::DynamicSameOrigin), "{dest:?}");
        }
    }

    #[test]
    fn test_cross_origin_static_is_cross_origin() {
        let request = req("https://cdn.example.net/lib.js").with_destination(Destination::Script);
        assert_eq!(classify(&request, &origin()), Some(RequestClass::CrossOrigin));
    }

    #[test]
    fn test_lowercase_get_is_accepted() {
        let mut request = req("https://somewheria.example/api");
        request.method = "get".to_string();
        assert_eq!(classify(&request, &origin()), Some(RequestClass::DynamicSameOrigin));
    }
}
