use std::fmt;

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

use super::policy::CorsPolicy;
use crate::request::Request;

/// What the CORS layer does with one request.
#[derive(Debug)]
pub enum Decision {
    /// No `Origin`: not a CORS request, forward untouched.
    Forward,
    /// Origin accepted, not a preflight: forward, then add `headers` to the
    /// downstream response.
    Simple { headers: HeaderMap },
    /// Preflight accepted: answer `204 No Content` with `headers`.
    Preflight { headers: HeaderMap },
    /// Terminal 4xx. `headers` holds the CORS headers computed before the
    /// failing check; it is empty for a rejected origin.
    Reject { rejection: Rejection, headers: HeaderMap },
}

/// Which check a rejected request failed, with the offending value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    Origin(String),
    Method(String),
    Headers(String),
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Origin(_) | Self::Headers(_) => StatusCode::FORBIDDEN,
            Self::Method(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin(origin) => write!(f, "origin `{origin}` not allowed"),
            Self::Method(method) => write!(f, "method `{method}` not allowed"),
            Self::Headers(headers) => write!(f, "headers `{headers}` not allowed"),
        }
    }
}

impl CorsPolicy {
    /// Runs the CORS state machine for `req`.
    ///
    /// Pure with respect to the policy: the same request always yields the
    /// same decision, and nothing is forwarded or written here.
    pub fn negotiate(&self, req: &Request) -> Decision {
        let Some(origin) = req.headers().get(ORIGIN).filter(|v| !v.is_empty()) else {
            return Decision::Forward;
        };

        if !origin.to_str().is_ok_and(|o| self.is_origin_allowed(o)) {
            return Decision::Reject {
                rejection: Rejection::Origin(lossy(origin)),
                headers: HeaderMap::new(),
            };
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.append(VARY, HeaderValue::from_static("Origin"));
        if self.allow_credentials {
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }

        let requested_method = match req.headers().get(ACCESS_CONTROL_REQUEST_METHOD) {
            Some(m) if *req.method() == Method::OPTIONS && !m.is_empty() => m,
            _ => return Decision::Simple { headers },
        };

        if !requested_method
            .to_str()
            .is_ok_and(|m| self.allowed_methods.contains(m))
        {
            return Decision::Reject {
                rejection: Rejection::Method(lossy(requested_method)),
                headers,
            };
        }

        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods_value.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers_value.clone());
        if let Some(value) = &self.expose_headers_value {
            headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, value.clone());
        }
        if let Some(value) = &self.max_age_value {
            headers.insert(ACCESS_CONTROL_MAX_AGE, value.clone());
        }

        let headers_allowed = match req.headers().get(ACCESS_CONTROL_REQUEST_HEADERS) {
            None => self.are_headers_allowed(""),
            Some(requested) => requested
                .to_str()
                .is_ok_and(|h| self.are_headers_allowed(h)),
        };
        if !headers_allowed {
            let requested = req
                .headers()
                .get(ACCESS_CONTROL_REQUEST_HEADERS)
                .map(lossy)
                .unwrap_or_default();
            return Decision::Reject { rejection: Rejection::Headers(requested), headers };
        }

        Decision::Preflight { headers }
    }
}

fn lossy(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

#[cfg(test)]
#[path = "negotiate_test.rs"]
mod negotiate_test;
