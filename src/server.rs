//! Serving a [`Pipeline`] over hyper, with graceful shutdown.
//!
//! The core never touches sockets. This module is the thin host adapter:
//! [`Pipeline`] implements hyper's `Service`, and [`Server`] runs the accept
//! loop for services that don't bring their own.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** (Kubernetes, systemd) or **SIGINT** (Ctrl-C) the server:
//! 1. stops accepting new connections,
//! 2. lets every in-flight connection task run to completion,
//! 3. returns from [`Server::serve`].

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::Service;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::{ConfigError, Error};
use crate::request::Request;
use crate::response::Response;
use crate::router::Pipeline;

impl Service<hyper::Request<Incoming>> for Pipeline {
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Infallible>> + Send>>;

    fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
        let pipeline = self.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    warn!("failed to read request body: {e}");
                    return Ok(Response::status(StatusCode::BAD_REQUEST).into_inner());
                }
            };
            let req = Request::from(http::Request::from_parts(parts, body));
            Ok(pipeline.handle(req).await.into_inner())
        })
    }
}

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use sluice::Server;
    /// let server = Server::bind("0.0.0.0:3000")?;
    /// # Ok::<(), sluice::Error>(())
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddress(addr.to_owned()))?;
        Ok(Self { addr })
    }

    /// Accepts connections and dispatches every request through `pipeline`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, pipeline: Pipeline) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "sluice listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting immediately,
                // even with connections queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let svc = pipeline.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the set does not grow without bound.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("sluice stopped");
        Ok(())
    }
}

/// Resolves on the first SIGTERM or SIGINT. Only Ctrl-C exists off Unix.
///
/// If a handler cannot be installed that signal is simply never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
