use http::header::USER_AGENT;
use http::{HeaderValue, Method, StatusCode, Uri};

use super::Logging;
use crate::Request;
use crate::handler::boxed;
use crate::middleware::Middleware;
use crate::test_support::Captured;

async fn run(logging: Logging, path: &'static str) -> StatusCode {
    let handler = logging.wrap(boxed(|_req: Request| async { "ok" }));
    let req = Request::new(Method::GET, Uri::from_static(path))
        .with_header(USER_AGENT, HeaderValue::from_static("curl/8.0"));
    handler.call(req).await.status_code()
}

#[tokio::test]
async fn should_log_request_given_path_not_excluded() {
    let captured = Captured::default();
    let logging = Logging::new().with_dispatch(captured.dispatch());

    let status = run(logging, "/api/v1/test").await;

    let logged = captured.contents();
    assert_eq!(status, StatusCode::OK);
    assert!(logged.contains("request received"), "got: {logged}");
    assert!(logged.contains("/api/v1/test"), "got: {logged}");
    assert!(logged.contains("GET"), "got: {logged}");
    assert!(logged.contains("curl/8.0"), "got: {logged}");
}

#[tokio::test]
async fn should_not_log_given_path_excluded() {
    let captured = Captured::default();
    let logging = Logging::new()
        .exclude(["/api"])
        .with_dispatch(captured.dispatch());

    let status = run(logging, "/api/v1/test").await;

    assert_eq!(status, StatusCode::OK);
    assert!(captured.contents().is_empty());
}

#[tokio::test]
async fn should_forward_given_no_subscriber_attached() {
    let status = run(Logging::new(), "/api").await;

    assert_eq!(status, StatusCode::OK);
}

#[test]
fn should_register_under_logging_name() {
    assert_eq!(Logging::new().name(), Some("logging"));
}

#[test]
fn should_keep_excluded_prefixes_in_order() {
    let logging = Logging::new().exclude(["/healthz", "/readyz"]);

    assert_eq!(
        logging.excluded().as_slice(),
        ["/healthz".to_string(), "/readyz".to_string()]
    );
}
