//! Access-log middleware.
//!
//! Emits one `INFO` event per request that is not under an excluded prefix,
//! then forwards. Nothing is awaited on the logging side: a subscriber that
//! drops or fails to write events cannot affect the request.

use std::sync::Arc;

use http::header::USER_AGENT;
use tracing::{Dispatch, info};

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::{ExcludedPrefixes, Middleware};
use crate::request::Request;

/// The logging layer.
///
/// Events go to the host's default subscriber unless an explicit
/// [`Dispatch`] is attached with [`Logging::with_dispatch`].
#[derive(Clone, Debug, Default)]
pub struct Logging {
    excluded: ExcludedPrefixes,
    dispatch: Option<Dispatch>,
}

impl Logging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths starting with any of `prefixes` are forwarded without a log line.
    pub fn exclude<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = ExcludedPrefixes::new(prefixes);
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn excluded(&self) -> &ExcludedPrefixes {
        &self.excluded
    }
}

impl Middleware for Logging {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(LoggingHandler { config: self.clone(), next })
    }

    fn name(&self) -> Option<&'static str> {
        Some("logging")
    }
}

struct LoggingHandler {
    config: Logging,
    next: BoxedHandler,
}

impl LoggingHandler {
    fn emit(&self, req: &Request) {
        let event = || {
            info!(
                method = %req.method(),
                url = %req.uri(),
                user_agent = req.header(USER_AGENT).unwrap_or_default(),
                "request received"
            );
        };
        match &self.config.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, event),
            None => event(),
        }
    }
}

impl ErasedHandler for LoggingHandler {
    fn call(&self, req: Request) -> BoxFuture {
        if !self.config.excluded.matches(req.path()) {
            self.emit(&req);
        }
        self.next.call(req)
    }
}

#[cfg(test)]
#[path = "logging_test.rs"]
mod logging_test;
