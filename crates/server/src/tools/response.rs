//! JSON view of a response for tool output.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_client::fetch::content_type;
use tether_core::Response;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    pub status: u16,
    pub status_text: String,
    /// One of basic, cors, opaque, error, synthetic.
    pub response_type: String,
    pub headers: Vec<(String, String)>,
    /// Body as UTF-8 text, when it is textual.
    pub body_text: Option<String>,
    /// Body as base64, when it is binary.
    pub body_base64: Option<String>,
    pub body_len: usize,
}

fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/") || mime.ends_with("json") || mime.ends_with("xml") || mime.ends_with("javascript")
}

impl From<&Response> for ResponseView {
    fn from(response: &Response) -> Self {
        let textual = content_type(response).is_none_or(is_textual);
        let text = if textual { std::str::from_utf8(&response.body).ok() } else { None };

        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            response_type: response.response_type.to_string(),
            headers: response.headers.clone(),
            body_text: text.map(str::to_string),
            body_base64: match text {
                Some(_) => None,
                None => Some(STANDARD.encode(&response.body)),
            },
            body_len: response.body.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_body() {
        let view = ResponseView::from(&Response::synthetic(503, Some("text/plain"), "Offline"));
        assert_eq!(view.status, 503);
        assert_eq!(view.body_text.as_deref(), Some("Offline"));
        assert!(view.body_base64.is_none());
        assert_eq!(view.response_type, "synthetic");
    }

    #[test]
    fn test_binary_body() {
        let view = ResponseView::from(&Response::synthetic(200, Some("image/png"), vec![0x89, b'P', b'N', b'G']));
        assert!(view.body_text.is_none());
        assert_eq!(view.body_base64.as_deref(), Some("iVBORw=="));
        assert_eq!(view.body_len, 4);
    }

    #[test]
    fn test_untyped_empty_body_is_text() {
        let view = ResponseView::from(&Response::synthetic(504, None, ""));
        assert_eq!(view.body_text.as_deref(), Some(""));
    }
}
