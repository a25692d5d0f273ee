//! CORS middleware.
//!
//! Wraps [`CorsPolicy::negotiate`]: rejections and successful preflights end
//! the request here, simple requests are forwarded and their response is
//! annotated on the way back.

use std::sync::Arc;

use bytes::Bytes;
use http::header::VARY;
use http::{HeaderMap, HeaderValue, StatusCode};
use tracing::{debug, warn};

use crate::cors::{CorsPolicy, Decision, Rejection};
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// The CORS layer. Cheap to clone; the policy is shared.
#[derive(Clone, Debug)]
pub struct Cors {
    policy: Arc<CorsPolicy>,
}

impl Cors {
    pub fn new(policy: CorsPolicy) -> Self {
        Self { policy: Arc::new(policy) }
    }

    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }
}

impl Middleware for Cors {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(CorsHandler { policy: Arc::clone(&self.policy), next })
    }

    fn name(&self) -> Option<&'static str> {
        Some("cors")
    }
}

struct CorsHandler {
    policy: Arc<CorsPolicy>,
    next: BoxedHandler,
}

impl ErasedHandler for CorsHandler {
    fn call(&self, req: Request) -> BoxFuture {
        match self.policy.negotiate(&req) {
            Decision::Forward => self.next.call(req),
            Decision::Simple { headers } => {
                let fut = self.next.call(req);
                Box::pin(async move {
                    let mut res = fut.await;
                    annotate(res.headers_mut(), &headers);
                    res
                })
            }
            Decision::Preflight { headers } => {
                debug!(path = req.path(), "cors preflight accepted");
                terminal(StatusCode::NO_CONTENT, headers)
            }
            Decision::Reject { rejection, headers } => {
                match &rejection {
                    Rejection::Origin(origin) => warn!(%origin, "request from origin not allowed"),
                    Rejection::Method(method) => warn!(%method, "request method not allowed"),
                    Rejection::Headers(requested) => warn!(headers = %requested, "request headers not allowed"),
                }
                terminal(rejection.status(), headers)
            }
        }
    }
}

/// Copies CORS headers onto a downstream response.
///
/// `Vary` is appended so the downstream handler's own values survive, unless
/// the handler already varies on that token; every other header replaces
/// whatever the handler set.
fn annotate(target: &mut HeaderMap, headers: &HeaderMap) {
    for (name, value) in headers {
        if *name != VARY {
            target.insert(name.clone(), value.clone());
        } else if !varies_on(target, value) {
            target.append(name.clone(), value.clone());
        }
    }
}

/// Whether any `Vary` line in `headers` already lists `token`
/// (case-insensitive), or is `*`.
fn varies_on(headers: &HeaderMap, token: &HeaderValue) -> bool {
    let Ok(token) = token.to_str() else {
        return false;
    };
    headers
        .get_all(VARY)
        .iter()
        .filter_map(|line| line.to_str().ok())
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .any(|listed| listed == "*" || listed.eq_ignore_ascii_case(token))
}

fn terminal(status: StatusCode, headers: HeaderMap) -> BoxFuture {
    Box::pin(std::future::ready(Response { status, headers, body: Bytes::new() }))
}

#[cfg(test)]
#[path = "cors_test.rs"]
mod cors_test;
