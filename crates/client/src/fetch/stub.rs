//! In-process network double for worker tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use tether_core::{Error, Request, Response, ResponseType};

use super::Network;

/// Route table keyed by full URL. Unrouted URLs fail like an offline network.
#[derive(Default)]
pub(crate) struct StubNetwork {
    routes: Mutex<HashMap<String, Response>>,
    calls: Mutex<Vec<String>>,
}

impl StubNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with `status` for `url`.
    pub(crate) fn route(self, url: &str, status: u16, body: &'static str) -> Self {
        let response = Response {
            status,
            status_text: String::new(),
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: Bytes::from_static(body.as_bytes()),
            response_type: ResponseType::Basic,
            url: url::Url::parse(url).ok(),
        };
        self.route_response(url, response)
    }

    pub(crate) fn route_response(self, url: &str, response: Response) -> Self {
        self.routes.lock().unwrap().insert(url.to_string(), response);
        self
    }

    /// Drop every route, simulating loss of connectivity.
    pub(crate) fn go_offline(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());
        self.routes
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .ok_or_else(|| Error::Network(format!("{url}: offline")))
    }
}
