//! Minimal sluice example: a JSON endpoint behind CORS, logging and telemetry.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42 -H 'origin: https://a.com'
//!   curl -i http://localhost:3000/users/42 -H 'origin: https://evil.example'
//!   curl -i -X OPTIONS http://localhost:3000/users \
//!        -H 'origin: https://a.com' \
//!        -H 'access-control-request-method: POST' \
//!        -H 'access-control-request-headers: Content-Type'
//!   curl http://localhost:3000/healthz

use http::StatusCode;
use http::header::LOCATION;
use sluice::middleware::telemetry::Metrics;
use sluice::{PipelineConfig, Request, Response, Server};

const CONFIG: &str = r#"
[cors]
allowed_methods = ["GET", "POST", "OPTIONS"]
allowed_origins = ["https://a.com"]
allowed_headers = ["Content-Type", "Accept"]
allow_credentials = true
max_age = 600

[logging]
excluded_prefixes = ["/healthz"]

[telemetry]
excluded_prefixes = ["/healthz"]
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config: PipelineConfig = toml::from_str(CONFIG)?;
    let pipeline = config.into_router(app, Metrics::global())?.build()?;

    Server::bind("0.0.0.0:3000")?.serve(pipeline).await?;
    Ok(())
}

// sluice does no routing; the base handler dispatches on its own.
async fn app(req: Request) -> Response {
    match (req.method().as_str(), req.path()) {
        ("GET", "/healthz") => Response::text("ok"),
        ("GET", path) if path.starts_with("/users/") => {
            let id = &path["/users/".len()..];
            Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
        }
        ("POST", "/users") if req.body().is_empty() => Response::status(StatusCode::BAD_REQUEST),
        ("POST", "/users") => Response::builder()
            .status(StatusCode::CREATED)
            .header(LOCATION, http::HeaderValue::from_static("/users/99"))
            .json(r#"{"id":"99","name":"new_user"}"#),
        _ => Response::status(StatusCode::NOT_FOUND),
    }
}
