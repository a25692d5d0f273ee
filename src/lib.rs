//! # sluice
//!
//! A small HTTP middleware pipeline: CORS negotiation, access logging and
//! request telemetry, composed once around a single handler.
//!
//! ## The contract
//!
//! sluice decides what happens to a request *before* and *after* your
//! handler runs. It does not route, parse bodies or terminate TLS. A
//! request either gets a terminal answer from a stage (a rejected origin, a
//! preflight) or passes through every enabled stage to the handler, and the
//! response unwinds back through them.
//!
//! - **CORS**: a pure [`CorsPolicy::negotiate`] state machine plus a stage
//!   that applies its [`Decision`](cors::Decision).
//! - **Logging**: one `tracing` event per request.
//! - **Telemetry**: one `tracing` span and two `metrics` series per request.
//! - **Composition**: [`Router`] builds a [`Pipeline`] once at startup.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sluice::middleware::logging::Logging;
//! use sluice::middleware::telemetry::{Metrics, Telemetry};
//! use sluice::{CorsPolicy, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sluice::Error> {
//!     let policy = CorsPolicy::builder()
//!         .allowed_methods(["GET", "POST", "OPTIONS"])
//!         .allowed_origins(["https://a.com"])
//!         .max_age(600)
//!         .build()?;
//!
//!     let pipeline = Router::new(hello)
//!         .cors(policy)
//!         .logging(Logging::new().exclude(["/healthz"]))
//!         .telemetry(Telemetry::new(Metrics::global()))
//!         .build()?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(pipeline).await
//! }
//!
//! async fn hello(_req: Request) -> Response {
//!     Response::text("hello")
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod cors;
pub mod middleware;

#[cfg(test)]
mod test_support;

pub use config::{CorsConfig, PipelineConfig, PrefixConfig};
pub use cors::CorsPolicy;
pub use error::{ConfigError, Error};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, boxed};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::{Pipeline, Router, StageKind};
pub use server::Server;
