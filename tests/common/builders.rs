use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use http::header::{ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use http::{HeaderName, HeaderValue, Method, Uri};
use sluice::cors::CorsPolicyBuilder;
use sluice::{BoxedHandler, CorsPolicy, Request, Response, boxed};

/// The policy from the preflight walkthrough: three methods, two headers,
/// credentials, ten-minute max-age, one allowed origin.
pub fn policy() -> CorsPolicyBuilder {
    CorsPolicy::builder()
        .allowed_methods(["GET", "POST", "OPTIONS"])
        .allowed_headers(["Content-Type", "Accept"])
        .allow_credentials(true)
        .max_age(600)
        .allowed_origins(["https://a.com"])
}

pub struct RequestBuilder {
    method: Method,
    uri: Uri,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl RequestBuilder {
    pub fn origin(self, origin: &str) -> Self {
        self.header(ORIGIN, origin)
    }

    pub fn request_method(self, method: &str) -> Self {
        self.header(ACCESS_CONTROL_REQUEST_METHOD, method)
    }

    pub fn request_headers(self, headers: &str) -> Self {
        self.header(ACCESS_CONTROL_REQUEST_HEADERS, headers)
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        self.headers.push((name, HeaderValue::from_str(value).unwrap()));
        self
    }

    /// Raw bytes, for values `HeaderValue::from_str` would refuse.
    pub fn header_bytes(mut self, name: HeaderName, value: &[u8]) -> Self {
        self.headers.push((name, HeaderValue::from_bytes(value).unwrap()));
        self
    }

    pub fn build(self) -> Request {
        self.headers
            .into_iter()
            .fold(Request::new(self.method, self.uri), |req, (name, value)| {
                req.with_header(name, value)
            })
    }
}

pub fn request(method: Method, path: &str) -> RequestBuilder {
    RequestBuilder {
        method,
        uri: path.parse().unwrap(),
        headers: Vec::new(),
    }
}

pub fn simple_request() -> RequestBuilder {
    request(Method::GET, "/x")
}

pub fn preflight_request() -> RequestBuilder {
    request(Method::OPTIONS, "/x")
}

/// A base handler that counts how often it is reached.
#[derive(Clone, Default)]
pub struct App {
    hits: Arc<AtomicUsize>,
}

impl App {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn handler(&self) -> BoxedHandler {
        let hits = Arc::clone(&self.hits);
        boxed(move |_req: Request| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Response::text("app")
            }
        })
    }
}
