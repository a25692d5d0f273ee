use http::header::VARY;
use http::HeaderMap;
use sluice::cors::{Decision, Rejection};

pub fn assert_simple(decision: Decision) -> HeaderMap {
    match decision {
        Decision::Simple { headers } => headers,
        other => panic!("expected simple decision, got {other:?}"),
    }
}

pub fn assert_preflight(decision: Decision) -> HeaderMap {
    match decision {
        Decision::Preflight { headers } => headers,
        other => panic!("expected preflight decision, got {other:?}"),
    }
}

pub fn assert_rejected(decision: Decision) -> (Rejection, HeaderMap) {
    match decision {
        Decision::Reject { rejection, headers } => (rejection, headers),
        other => panic!("expected rejection, got {other:?}"),
    }
}

pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn vary_values(headers: &HeaderMap) -> Vec<&str> {
    headers
        .get_all(VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect()
}

pub fn has_cors_headers(headers: &HeaderMap) -> bool {
    headers
        .keys()
        .any(|name| name.as_str().starts_with("access-control-"))
}
